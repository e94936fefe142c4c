//! Implementation of the `casegen check` command.

use std::collections::BTreeSet;
use std::fs::read_to_string;
use std::iter::once;
use std::ops::Range;
use std::path::{Path, PathBuf};

use casegen::interpreter::RESERVED_PREFIX;
use casegen::GenerateError;
use casegen::parser::{
    active_lines, parse_expression, parse_line, split_top_level, Assertion, SizeExpr, TypeSpec,
};
use miette::{IntoDiagnostic, Report, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::output::diagnostic::locate;
use crate::output::table::{format_fragment_table, LineFragments};
use crate::output::TemplateDiagnostic;

/// Names bound per element by collection assertions.
const INDEX_NAMES: [&str; 2] = ["i", "j"];

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Template files to check (.gen)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of checking one template file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    lines: Vec<LineFragments>,
    warnings: Vec<CheckWarning>,
    errors: Vec<String>,
    #[serde(skip)]
    diagnostics: Vec<TemplateDiagnostic>,
}

#[derive(Debug, Serialize)]
struct CheckWarning {
    line: usize,
    message: String,
}

/// An expression found in a line, with its byte span in the line.
struct LineExpression {
    text: String,
    span: Range<usize>,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let mut code = exitcode::OK;
    let mut reports = Vec::new();

    for path in &args.files {
        let content = match read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Cannot read template {}: {}", path.display(), e);
                code = exitcode::NOINPUT;
                continue;
            }
        };
        let report = check_template(path, &content);
        if !report.errors.is_empty() && code == exitcode::OK {
            code = exitcode::DATAERR;
        }
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports).into_diagnostic()?);
        return Ok(code);
    }

    for report in reports {
        print_report(report);
    }
    Ok(code)
}

fn print_report(report: FileReport) {
    if !report.lines.is_empty() {
        println!("{}", format_fragment_table(&report.lines));
    }
    for warning in &report.warnings {
        eprintln!(
            "{} line {}: {}",
            "warning:".yellow().bold(),
            warning.line,
            warning.message
        );
    }
    let error_count = report.diagnostics.len();
    for diagnostic in report.diagnostics {
        eprintln!("{:?}", Report::new(diagnostic));
    }
    if error_count == 0 {
        println!(
            "{} {}: {} line(s) OK",
            "✓".green(),
            report.file,
            report.lines.len()
        );
    } else {
        println!("{} {}: {} error(s)", "✗".red(), report.file, error_count);
    }
}

/// Parse every active line of a template without evaluating anything.
fn check_template(path: &Path, content: &str) -> FileReport {
    let mut report = FileReport {
        file: path.display().to_string(),
        lines: Vec::new(),
        warnings: Vec::new(),
        errors: Vec::new(),
        diagnostics: Vec::new(),
    };

    let Some(lines) = active_lines(content) else {
        let diagnostic = TemplateDiagnostic::from_generate_error(
            path,
            content,
            &GenerateError::MissingBegin,
        );
        report.errors.push(diagnostic.to_string());
        report.diagnostics.push(diagnostic);
        return report;
    };

    let mut assigned: BTreeSet<String> = BTreeSet::new();
    for line in lines {
        let parsed = parse_line(line.text);
        let mut warn = |message: String| {
            report.warnings.push(CheckWarning {
                line: line.number,
                message,
            });
        };

        let Some(declared) = &parsed.declared_type else {
            if !line.text.trim().is_empty() {
                warn("no [type] found, line skipped".to_string());
            }
            continue;
        };
        if parsed.extra_brackets > 0 {
            warn(format!(
                "{} more bracket pair(s) after the type; only the first [] is the type",
                parsed.extra_brackets
            ));
        }
        let Some(spec) = TypeSpec::parse(&declared.text) else {
            warn(format!("unknown type '[{}]', line skipped", declared.text.trim()));
            continue;
        };

        let mut expressions = size_expressions(&spec, &declared.text, declared.span.start);
        if matches!(
            spec,
            TypeSpec::Int | TypeSpec::IntList { .. } | TypeSpec::IntMatrix { .. }
        ) {
            if let Some(constraint) = &parsed.constraint {
                expressions.extend(split_parts(&constraint.text, constraint.span.start));
            }
        }
        if let Some(assertion) = &parsed.assertion {
            let fragment = assertion.fragment();
            expressions.push(LineExpression {
                text: fragment.text.clone(),
                span: fragment.span.clone(),
            });
        }

        let mut problems = Vec::new();
        if let Some(name) = &parsed.variable_name {
            if name.text.starts_with(RESERVED_PREFIX) {
                problems.push((
                    name.span.clone(),
                    format!("variable name '{}' uses the reserved prefix '_gen'", name.text),
                ));
            } else if name.text.starts_with(|c: char| c.is_ascii_digit()) {
                problems.push((name.span.clone(), format!("invalid variable name '{}'", name.text)));
            }
        }

        let mut unknown: Vec<String> = Vec::new();
        for expression in &expressions {
            match parse_expression(expression.text.trim()) {
                Ok(expr) => {
                    for name in expr.free_names() {
                        let known = assigned.contains(&name)
                            || INDEX_NAMES.contains(&name.as_str())
                            || unknown.contains(&name);
                        if !known {
                            unknown.push(name);
                        }
                    }
                }
                Err(e) => problems.push((
                    expression.span.clone(),
                    format!("invalid expression '{}': {}", expression.text.trim(), e),
                )),
            }
        }
        for name in unknown {
            warn(format!("'{name}' is not assigned by an earlier line"));
        }

        for (span, message) in problems {
            let diagnostic =
                TemplateDiagnostic::at_fragment(path, content, line.number, span, message);
            report.errors.push(diagnostic.to_string());
            report.diagnostics.push(diagnostic);
        }

        if let Some(name) = &parsed.variable_name {
            assigned.insert(name.text.clone());
        }
        report.lines.push(LineFragments {
            line: line.number,
            name: parsed.variable_name.as_ref().map(|name| name.text.clone()),
            declared_type: spec.to_string(),
            constraint: parsed.constraint.as_ref().map(|c| c.text.clone()),
            assertion: parsed.assertion.as_ref().map(|assertion| match assertion {
                Assertion::Single(fragment) => format!("@{}@", fragment.text),
                Assertion::Double(fragment) => format!("@@{}@@", fragment.text),
            }),
            suffix: format!("{:?}", parsed.suffix),
        });
    }
    report
}

/// The expressions inside a type declaration, located within the line.
fn size_expressions(spec: &TypeSpec, declared: &str, offset: usize) -> Vec<LineExpression> {
    let sizes: Vec<&SizeExpr> = match spec {
        TypeSpec::Int => Vec::new(),
        TypeSpec::IntList { size, .. } => vec![size],
        TypeSpec::IntMatrix { dims } => return split_parts(dims, offset + locate_start(declared, dims)),
        TypeSpec::Str { size } => size.iter().collect(),
        TypeSpec::StrList {
            list_len, str_len, ..
        } => once(list_len).chain(str_len).collect(),
    };

    let mut expressions = Vec::new();
    for size in sizes {
        match size {
            SizeExpr::Exact(text) if text.trim().is_empty() => {}
            SizeExpr::Exact(text) => expressions.push(LineExpression {
                text: text.clone(),
                span: locate(declared, text).map_or(offset..offset + declared.len(), |span| {
                    offset + span.start..offset + span.end
                }),
            }),
            SizeExpr::Range(inner) => {
                expressions.extend(split_parts(inner, offset + locate_start(declared, inner)));
            }
        }
    }
    expressions
}

/// Split a comma-separated group into its located expressions.
fn split_parts(text: &str, offset: usize) -> Vec<LineExpression> {
    split_top_level(text, ',', None)
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let start = offset + (part.as_ptr() as usize - text.as_ptr() as usize);
            LineExpression {
                text: part.to_string(),
                span: start..start + part.len(),
            }
        })
        .collect()
}

fn locate_start(haystack: &str, needle: &str) -> usize {
    locate(haystack, needle).map_or(0, |span| span.start)
}
