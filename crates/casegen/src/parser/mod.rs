//! Template and expression parsing.
//!
//! This module turns raw template text into structured pieces: the active
//! `#begin`/`#end` section, the fragments of each declaration line, the
//! declared type, and expression ASTs. Nothing here evaluates anything.

pub mod ast;
pub mod error;
mod declaration;
mod escape;
mod expr;
mod line;
mod scan;
mod template;

pub use ast::*;
pub use declaration::{SizeExpr, TYPE_KEYWORDS, TypeSpec};
pub use error::ParseError;
pub use escape::unescape;
pub use expr::parse_expression;
pub use line::{Assertion, Fragment, TemplateLine, parse_line};
pub use scan::split_top_level;
pub use template::{BEGIN_MARKER, END_MARKER, SourceLine, active_lines};
