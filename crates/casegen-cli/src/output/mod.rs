//! Output formatting: diagnostics and tables.

pub mod diagnostic;
pub mod table;

pub use diagnostic::TemplateDiagnostic;
