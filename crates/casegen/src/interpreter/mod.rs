//! Template interpreter: expression evaluation, value generation and the
//! line-by-line driver.
//!
//! This module takes the fragments produced by the parser, evaluates their
//! expressions against the run's [`Scope`], synthesizes or asserts typed
//! values, and renders them into the output buffer.

mod alphabet;
mod builtins;
mod context;
mod error;
mod evaluator;
mod generator;
mod generators;
mod scope;
mod sink;

pub use alphabet::expand_alphabet;
pub use builtins::BUILTINS;
pub use context::EvalContext;
pub use error::{
    ErrorKind, EvalError, GenerateError, GenerateWarning, LineError, MAX_SEQUENCE_LEN,
    RESERVED_PREFIX, ShapeError, SinkError, SizeBound, WarningKind, compute_suggestions,
};
pub use evaluator::{eval_expr, evaluate, evaluate_split};
pub use generator::{DEFAULT_COMPACT_LENGTH, Generation, Generator, compact};
pub use generators::Generated;
pub use scope::Scope;
pub use sink::{MemorySink, Sink};
