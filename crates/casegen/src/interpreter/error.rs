//! Error and warning types for template generation.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::path::PathBuf;

use strsim::levenshtein;
use thiserror::Error;

use crate::parser::ParseError;
use crate::types::Value;

/// Variable names may not start with this prefix.
pub const RESERVED_PREFIX: &str = "_gen";

/// Upper bound on the length of any list or string built during a run.
pub const MAX_SEQUENCE_LEN: usize = 10_000_000;

/// Coarse classification of a fatal generation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The template has no `#begin` marker.
    Structural,
    /// A line is malformed: bad name, missing size, range or alphabet.
    Parse,
    /// An expression failed to parse or evaluate.
    Evaluation,
    /// A generated or asserted value does not have the declared size.
    Shape,
    /// The template could not be read.
    Io,
    /// The output could not be emitted.
    Sink,
}

/// An error that occurred while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The expression text is not valid syntax.
    #[error("invalid expression: {0}")]
    Parse(#[from] ParseError),

    /// A name is neither an extra binding nor assigned in the scope.
    #[error("name '{name}' is not defined{}", did_you_mean(suggestions))]
    UndefinedName {
        name: String,
        suggestions: Vec<String>,
    },

    /// A call to a function that is not a builtin.
    #[error("unknown function '{name}'{}", did_you_mean(suggestions))]
    UnknownFunction {
        name: String,
        suggestions: Vec<String>,
    },

    /// A binary operator applied to operands it does not support.
    #[error("unsupported operand types for {op}: {left} and {right}")]
    OperandTypes {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    /// A value of the wrong type where a specific type is required.
    #[error("expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    /// A list or string longer than [`MAX_SEQUENCE_LEN`].
    #[error("sequence of length {len} exceeds the limit of {MAX_SEQUENCE_LEN}")]
    TooLarge { len: usize },

    #[error("negative exponent {0} is not supported")]
    NegativeExponent(i64),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// Wrong number of arguments passed to a builtin.
    #[error("{function}() expects {expected} arguments, got {got}")]
    ArgumentCount {
        function: String,
        expected: &'static str,
        got: usize,
    },

    /// A random range whose low bound exceeds its high bound.
    #[error("empty range: low {low} is greater than high {high}")]
    EmptyRange { low: i64, high: i64 },

    #[error("{function}() arg is an empty sequence")]
    EmptySequence { function: &'static str },

    #[error("invalid argument for {function}(): {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },
}

/// A fatal problem with one template line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("variable name '{name}' uses the reserved prefix '_gen'")]
    ReservedName { name: String },

    #[error("invalid variable name '{name}'")]
    InvalidName { name: String },

    #[error("[{keyword}] requires a size")]
    MissingSize { keyword: &'static str },

    #[error("[{keyword}] requires a parenthesised alphabet such as (a-z)")]
    MissingAlphabet { keyword: &'static str },

    #[error("alphabet '({alphabet})' contains no characters")]
    EmptyAlphabet { alphabet: String },

    #[error("range '({text})' must have exactly two parts, got {parts}")]
    MalformedRange { text: String, parts: usize },

    #[error("[intmatrix] dimensions '{text}' must be two expressions separated by ','")]
    MalformedDimensions { text: String },

    /// A size expression that does not evaluate to a non-negative integer.
    #[error("size '{expression}' must be a non-negative integer, got {value}")]
    InvalidSize { expression: String, value: String },

    #[error("failed to evaluate '{expression}': {source}")]
    Eval {
        expression: String,
        #[source]
        source: EvalError,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// A generated or asserted value whose size does not match the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("[{keyword}] expected {expected} elements, got {got}")]
    Length {
        keyword: &'static str,
        expected: SizeBound,
        got: usize,
    },

    #[error("[intmatrix] expected {expected} rows, got {got}")]
    Rows { expected: usize, got: usize },

    #[error("[intmatrix] row {row} expected {expected} columns, got {got}")]
    Columns {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// An asserted value that is not the collection the type requires.
    #[error("[{keyword}] expected {expected}, got {got}")]
    NotCollection {
        keyword: &'static str,
        expected: &'static str,
        got: &'static str,
    },
}

/// The admissible size of a collection: exact, or the range it was sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBound {
    Exactly(usize),
    Between(usize, usize),
}

impl SizeBound {
    /// Whether a collection of `len` elements satisfies this bound.
    pub fn admits(self, len: usize) -> bool {
        match self {
            SizeBound::Exactly(n) => len == n,
            SizeBound::Between(low, high) => (low..=high).contains(&len),
        }
    }
}

impl Display for SizeBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SizeBound::Exactly(n) => write!(f, "{n}"),
            SizeBound::Between(low, high) => write!(f, "between {low} and {high}"),
        }
    }
}

/// A fatal error that aborts a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The template file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no '#begin' marker found in template")]
    MissingBegin,

    /// A line failed; carries the 1-based line number and the line text.
    #[error("line {number}: {source}\n> {text}")]
    Line {
        number: usize,
        text: String,
        #[source]
        source: LineError,
    },

    #[error("failed to emit output: {0}")]
    Sink(#[from] SinkError),
}

/// Failure reported by an output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("sink unavailable: {reason}")]
    Unavailable { reason: String },
}

impl EvalError {
    /// Build an `ArgumentCount` error for a builtin.
    pub(crate) fn arity(function: &str, expected: &'static str, got: usize) -> Self {
        EvalError::ArgumentCount {
            function: function.to_string(),
            expected,
            got,
        }
    }

    pub(crate) fn mismatch(expected: &'static str, got: &Value) -> Self {
        EvalError::TypeMismatch {
            expected,
            got: got.type_name(),
        }
    }

    /// Reject sequence lengths above [`MAX_SEQUENCE_LEN`].
    pub(crate) fn check_len(len: usize) -> Result<usize, EvalError> {
        if len > MAX_SEQUENCE_LEN {
            Err(EvalError::TooLarge { len })
        } else {
            Ok(len)
        }
    }
}

impl LineError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineError::ReservedName { .. }
            | LineError::InvalidName { .. }
            | LineError::MissingSize { .. }
            | LineError::MissingAlphabet { .. }
            | LineError::EmptyAlphabet { .. }
            | LineError::MalformedRange { .. }
            | LineError::MalformedDimensions { .. } => ErrorKind::Parse,
            LineError::InvalidSize { .. } | LineError::Eval { .. } => ErrorKind::Evaluation,
            LineError::Shape(_) => ErrorKind::Shape,
        }
    }

    pub(crate) fn eval(expression: &str, source: EvalError) -> Self {
        LineError::Eval {
            expression: expression.trim().to_string(),
            source,
        }
    }
}

impl GenerateError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::Io { .. } => ErrorKind::Io,
            GenerateError::MissingBegin => ErrorKind::Structural,
            GenerateError::Line { source, .. } => source.kind(),
            GenerateError::Sink(_) => ErrorKind::Sink,
        }
    }

    /// The 1-based template line the error occurred on, if any.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            GenerateError::Line { number, .. } => Some(*number),
            _ => None,
        }
    }
}

/// A non-fatal oddity noticed while generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateWarning {
    /// 1-based template line number.
    pub line: usize,
    pub kind: WarningKind,
}

/// The kinds of non-fatal generation warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A non-blank line without a `[type]`; it produces no output.
    NoType,
    /// A `[type]` whose keyword is not recognised; the line is skipped.
    UnknownType {
        declared: String,
        suggestion: Option<String>,
    },
    /// More bracket pairs than the type bracket; only the first is the type.
    MultipleBrackets { count: usize },
    /// No range for a type that synthesizes random integers.
    MissingRange { keyword: &'static str },
}

impl Display for WarningKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            WarningKind::NoType => write!(f, "no [type] found, line skipped"),
            WarningKind::UnknownType {
                declared,
                suggestion: Some(suggestion),
            } => write!(
                f,
                "unknown type '[{declared}]', line skipped; did you mean '{suggestion}'?"
            ),
            WarningKind::UnknownType { declared, .. } => {
                write!(f, "unknown type '[{declared}]', line skipped")
            }
            WarningKind::MultipleBrackets { count } => write!(
                f,
                "{count} more bracket pair(s) after the type; only the first [] is the type"
            ),
            WarningKind::MissingRange { keyword } => {
                write!(f, "[{keyword}] has no (low,high) range")
            }
        }
    }
}

impl Display for GenerateWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Compute "did you mean" suggestions for an unknown name.
///
/// Candidates within edit distance 1 (for names of up to 3 characters) or
/// 2 (longer names) are returned closest first, at most three of them.
pub fn compute_suggestions(name: &str, available: &[String]) -> Vec<String> {
    let max_distance = if name.chars().count() <= 3 { 1 } else { 2 };
    let mut scored: Vec<(usize, &String)> = available
        .iter()
        .map(|candidate| (levenshtein(name, candidate), candidate))
        .filter(|&(distance, _)| distance <= max_distance)
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean: {}?", suggestions.join(", "))
    }
}
