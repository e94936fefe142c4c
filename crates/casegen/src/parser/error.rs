//! Parse error types for template expressions.

use thiserror::Error;

/// An error that occurred while parsing an expression.
///
/// Columns are 1-based character positions within the expression text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A syntax error with location information.
    #[error("syntax error at column {column}: {message}")]
    Syntax { column: usize, message: String },

    /// Input ended while a construct was still open.
    #[error("unexpected end of expression at column {column}")]
    UnexpectedEof { column: usize },

    /// The expression was empty or whitespace only.
    #[error("empty expression")]
    Empty,
}

impl ParseError {
    /// Column of the error, if it has one.
    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { column, .. } | ParseError::UnexpectedEof { column } => {
                Some(*column)
            }
            ParseError::Empty => None,
        }
    }
}
