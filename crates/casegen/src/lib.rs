pub mod interpreter;
pub mod parser;
pub mod types;

pub use interpreter::{
    DEFAULT_COMPACT_LENGTH, ErrorKind, EvalContext, EvalError, GenerateError, GenerateWarning,
    Generation, Generator, LineError, MAX_SEQUENCE_LEN, MemorySink, ShapeError, Sink, SinkError,
    SizeBound, Scope, WarningKind, compact, compute_suggestions, evaluate, evaluate_split,
};
pub use types::Value;

/// Creates a [`Scope`] from name-value pairs.
///
/// Values are converted via `Into<Value>`, so integers, strings and vectors
/// of them can be passed directly.
///
/// # Example
///
/// ```
/// use casegen::{scope, Value};
///
/// let s = scope! { "n" => 3, "name" => "casegen" };
/// assert_eq!(s.len(), 2);
/// assert_eq!(s.lookup("n"), Some(&Value::Int(3)));
/// ```
#[macro_export]
macro_rules! scope {
    {} => {
        $crate::Scope::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut scope = $crate::Scope::new();
            $(
                scope.assign($key, ::std::convert::Into::<$crate::Value>::into($value));
            )+
            scope
        }
    };
}
