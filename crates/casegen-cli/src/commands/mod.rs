//! CLI command implementations.

mod check;
mod eval;
mod generate;

pub use check::{run_check, CheckArgs};
pub use eval::{run_eval, EvalArgs};
pub use generate::{run_gen, GenArgs};
