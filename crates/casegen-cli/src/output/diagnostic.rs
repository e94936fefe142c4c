//! Miette diagnostic wrapper for template errors.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![allow(unused_assignments)]

use std::ops::Range;
use std::path::Path;

use casegen::parser::{parse_line, ParseError, TemplateLine};
use casegen::{EvalError, GenerateError, LineError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic pointing into a template file.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(casegen::template))]
pub struct TemplateDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,

    message: String,

    #[help]
    help: Option<String>,
}

impl TemplateDiagnostic {
    /// Create a diagnostic from a failed generation run.
    pub fn from_generate_error(path: &Path, content: &str, err: &GenerateError) -> Self {
        match err {
            GenerateError::Line {
                number,
                text,
                source,
            } => {
                let local = error_span(text, source);
                TemplateDiagnostic {
                    src: named(path, content),
                    span: Some(span_in(content, *number, local)),
                    message: format!("line {number}: {source}"),
                    help: help_for(source),
                }
            }
            GenerateError::MissingBegin => TemplateDiagnostic {
                src: named(path, content),
                span: None,
                message: err.to_string(),
                help: Some("put a '#begin' line before the declarations".to_string()),
            },
            other => TemplateDiagnostic {
                src: named(path, content),
                span: None,
                message: other.to_string(),
                help: None,
            },
        }
    }

    /// Create a diagnostic for a fragment of a line, e.g. an expression
    /// that does not parse.
    pub fn at_fragment(
        path: &Path,
        content: &str,
        line_number: usize,
        fragment: Range<usize>,
        message: String,
    ) -> Self {
        TemplateDiagnostic {
            src: named(path, content),
            span: Some(span_in(content, line_number, fragment)),
            message: format!("line {line_number}: {message}"),
            help: None,
        }
    }
}

fn named(path: &Path, content: &str) -> NamedSource<String> {
    NamedSource::new(path.display().to_string(), content.to_string())
}

/// Convert a byte range within line `line_number` (1-based) to a span in
/// the whole file.
fn span_in(content: &str, line_number: usize, local: Range<usize>) -> SourceSpan {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line_number.saturating_sub(1))
        .map(str::len)
        .sum();
    // miette requires spans within the source
    let offset = (line_start + local.start).min(content.len());
    let len = local.len().max(1).min(content.len() - offset);
    (offset, len).into()
}

/// The part of the line an error is about.
fn error_span(text: &str, err: &LineError) -> Range<usize> {
    let line = parse_line(text);
    let whole = 0..text.len();
    let type_span = line
        .declared_type
        .as_ref()
        .map_or(whole.clone(), |fragment| fragment.span.clone());

    match err {
        LineError::ReservedName { .. } | LineError::InvalidName { .. } => line
            .variable_name
            .map_or(whole, |fragment| fragment.span),
        LineError::MissingAlphabet { .. }
        | LineError::MissingSize { .. }
        | LineError::MalformedDimensions { .. }
        | LineError::Shape(_) => type_span,
        LineError::EmptyAlphabet { .. } | LineError::MalformedRange { .. } => {
            constraint_span(&line).unwrap_or(type_span)
        }
        LineError::InvalidSize { expression, .. } | LineError::Eval { expression, .. } => {
            locate(text, expression).unwrap_or(type_span)
        }
    }
}

fn constraint_span(line: &TemplateLine) -> Option<Range<usize>> {
    line.constraint.as_ref().map(|fragment| fragment.span.clone())
}

/// Byte range of the last occurrence of `needle` in `text`.
pub fn locate(text: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    text.rfind(needle).map(|start| start..start + needle.len())
}

fn help_for(err: &LineError) -> Option<String> {
    match err {
        LineError::MissingAlphabet { .. } => {
            Some("add an alphabet group after the type, e.g. (a-z0-9)".to_string())
        }
        LineError::Shape(_) => {
            Some("an asserted collection must match the declared size".to_string())
        }
        LineError::Eval {
            source: EvalError::Parse(parse),
            ..
        } => parse_help(parse),
        _ => None,
    }
}

fn parse_help(err: &ParseError) -> Option<String> {
    err.column()
        .map(|column| format!("the expression is malformed at column {column}"))
}
