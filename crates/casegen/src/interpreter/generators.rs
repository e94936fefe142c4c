//! Per-type value generation and rendering.
//!
//! Every generator follows the same shape: an assertion, when present,
//! determines the value; otherwise sizes, ranges and alphabets are evaluated
//! and a value is synthesized. The value's shape is validated afterwards in
//! both cases, then rendered to text.

use crate::interpreter::alphabet::expand_alphabet;
use crate::interpreter::error::{LineError, ShapeError, SizeBound, WarningKind};
use crate::interpreter::evaluator::{evaluate, evaluate_split};
use crate::interpreter::{EvalContext, EvalError};
use crate::parser::{Assertion, SizeExpr, TemplateLine, TypeSpec};
use crate::types::Value;

/// A generated value and its rendering, without the line suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub value: Value,
    pub text: String,
}

/// Generate the value a declaration line describes.
pub(crate) fn generate(
    spec: &TypeSpec,
    line: &TemplateLine,
    ctx: &mut EvalContext<'_>,
) -> Result<Generated, LineError> {
    match spec {
        TypeSpec::Int => generate_int(line, ctx),
        TypeSpec::IntList { size, newline } => generate_intlist(size, *newline, line, ctx),
        TypeSpec::IntMatrix { dims } => generate_intmatrix(dims, line, ctx),
        TypeSpec::Str { size } => generate_str(size.as_ref(), line, ctx),
        TypeSpec::StrList {
            list_len,
            str_len,
            newline,
        } => generate_strlist(list_len, str_len.as_ref(), *newline, line, ctx),
    }
}

fn generate_int(line: &TemplateLine, ctx: &mut EvalContext<'_>) -> Result<Generated, LineError> {
    let value = if let Some(assertion) = &line.assertion {
        eval_text(&assertion.fragment().text, ctx)?
    } else if let Some(constraint) = &line.constraint {
        let (low, high) = range_bounds(&constraint.text, ctx)?;
        Value::Int(sample(low, high, &constraint.text, ctx)?)
    } else {
        ctx.add_warning(WarningKind::MissingRange { keyword: "int" });
        Value::Int(0)
    };
    let text = value.to_string();
    Ok(Generated { value, text })
}

fn generate_intlist(
    size: &SizeExpr,
    newline: bool,
    line: &TemplateLine,
    ctx: &mut EvalContext<'_>,
) -> Result<Generated, LineError> {
    const KEYWORD: &str = "intlist";
    let declared = resolve_size(size, ctx)?;

    let items = match &line.assertion {
        Some(Assertion::Double(fragment)) => {
            into_list(eval_text(&fragment.text, ctx)?, KEYWORD, "list")?
        }
        Some(Assertion::Single(fragment)) => (0..required(declared, KEYWORD)?)
            .map(|i| {
                ctx.bind("i", index_value(i));
                eval_text(&fragment.text, ctx)
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            let len = required(declared, KEYWORD)?;
            match &line.constraint {
                Some(constraint) => {
                    let (low, high) = range_bounds(&constraint.text, ctx)?;
                    (0..len)
                        .map(|_| sample(low, high, &constraint.text, ctx).map(Value::Int))
                        .collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    ctx.add_warning(WarningKind::MissingRange { keyword: KEYWORD });
                    Vec::new()
                }
            }
        }
    };

    if let Some((_, bound)) = declared {
        check_length(KEYWORD, bound, items.len())?;
    }
    let text = join(&items, separator(newline));
    Ok(Generated {
        value: Value::List(items),
        text,
    })
}

fn generate_intmatrix(
    dims: &str,
    line: &TemplateLine,
    ctx: &mut EvalContext<'_>,
) -> Result<Generated, LineError> {
    const KEYWORD: &str = "intmatrix";
    let declared = resolve_dimensions(dims, ctx)?;
    let shape = || declared.ok_or(LineError::MissingSize { keyword: KEYWORD });

    let matrix: Vec<Vec<Value>> = match &line.assertion {
        Some(Assertion::Double(fragment)) => {
            into_list(eval_text(&fragment.text, ctx)?, KEYWORD, "list of rows")?
                .into_iter()
                .map(|row| into_list(row, KEYWORD, "list of rows"))
                .collect::<Result<_, _>>()?
        }
        Some(Assertion::Single(fragment)) => {
            let (rows, columns) = shape()?;
            let mut matrix = Vec::with_capacity(rows);
            for i in 0..rows {
                ctx.bind("i", index_value(i));
                let row = (0..columns)
                    .map(|j| {
                        ctx.bind("j", index_value(j));
                        eval_text(&fragment.text, ctx)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                matrix.push(row);
            }
            matrix
        }
        None => {
            let (rows, columns) = shape()?;
            match &line.constraint {
                Some(constraint) => {
                    let (low, high) = range_bounds(&constraint.text, ctx)?;
                    let mut matrix = Vec::with_capacity(rows);
                    for _ in 0..rows {
                        let row = (0..columns)
                            .map(|_| sample(low, high, &constraint.text, ctx).map(Value::Int))
                            .collect::<Result<Vec<_>, _>>()?;
                        matrix.push(row);
                    }
                    matrix
                }
                None => {
                    ctx.add_warning(WarningKind::MissingRange { keyword: KEYWORD });
                    vec![Vec::new(); rows]
                }
            }
        }
    };

    if let Some((rows, columns)) = declared {
        check_shape(&matrix, rows, columns)?;
    }

    let text = matrix
        .iter()
        .map(|cells| join(cells, " "))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Generated {
        value: Value::List(matrix.into_iter().map(Value::List).collect()),
        text,
    })
}

fn check_shape(matrix: &[Vec<Value>], rows: usize, columns: usize) -> Result<(), LineError> {
    if matrix.len() != rows {
        return Err(ShapeError::Rows {
            expected: rows,
            got: matrix.len(),
        }
        .into());
    }
    if let Some((row, cells)) = matrix
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != columns)
    {
        return Err(ShapeError::Columns {
            row,
            expected: columns,
            got: cells.len(),
        }
        .into());
    }
    Ok(())
}

fn generate_str(
    size: Option<&SizeExpr>,
    line: &TemplateLine,
    ctx: &mut EvalContext<'_>,
) -> Result<Generated, LineError> {
    const KEYWORD: &str = "str";

    let value = if let Some(assertion) = &line.assertion {
        let value = eval_text(&assertion.fragment().text, ctx)?;
        let declared = size.map(|size| resolve_size(size, ctx)).transpose()?.flatten();
        if let Some((_, bound)) = declared {
            let len = value.len().ok_or(ShapeError::NotCollection {
                keyword: KEYWORD,
                expected: "str",
                got: value.type_name(),
            })?;
            check_length(KEYWORD, bound, len)?;
        }
        value
    } else {
        let declared = size.map(|size| resolve_size(size, ctx)).transpose()?.flatten();
        let len = required(declared, KEYWORD)?;
        let alphabet = alphabet(line, KEYWORD)?;
        Value::Str(random_string(&alphabet, len, ctx))
    };

    let text = value.to_string();
    Ok(Generated { value, text })
}

fn generate_strlist(
    list_len: &SizeExpr,
    str_len: Option<&SizeExpr>,
    newline: bool,
    line: &TemplateLine,
    ctx: &mut EvalContext<'_>,
) -> Result<Generated, LineError> {
    const KEYWORD: &str = "strlist";
    let declared = resolve_size(list_len, ctx)?;

    let items = match &line.assertion {
        Some(Assertion::Double(fragment)) => {
            into_list(eval_text(&fragment.text, ctx)?, KEYWORD, "list")?
        }
        Some(Assertion::Single(fragment)) => (0..required(declared, KEYWORD)?)
            .map(|i| {
                ctx.bind("i", index_value(i));
                eval_text(&fragment.text, ctx)
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            let len = required(declared, KEYWORD)?;
            let str_len = str_len.ok_or(LineError::MissingSize { keyword: KEYWORD })?;
            let max_len = required(resolve_size(str_len, ctx)?, KEYWORD)?;
            bounded(len.saturating_mul(max_len), &str_len.to_string())?;
            let alphabet = alphabet(line, KEYWORD)?;
            let max_len = i64::try_from(max_len).map_err(|_| {
                LineError::eval(&str_len.to_string(), EvalError::Overflow)
            })?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                let element_len = ctx
                    .randint(1, max_len)
                    .map_err(|err| LineError::eval(&str_len.to_string(), err))?;
                let element_len = usize::try_from(element_len).unwrap_or_default();
                items.push(Value::Str(random_string(&alphabet, element_len, ctx)));
            }
            items
        }
    };

    if let Some((_, bound)) = declared {
        check_length(KEYWORD, bound, items.len())?;
    }
    let text = join(&items, separator(newline));
    Ok(Generated {
        value: Value::List(items),
        text,
    })
}

fn eval_text(expression: &str, ctx: &mut EvalContext<'_>) -> Result<Value, LineError> {
    evaluate(expression, ctx).map_err(|err| LineError::eval(expression, err))
}

/// Evaluate a `low,high` range to its two integer bounds.
fn range_bounds(text: &str, ctx: &mut EvalContext<'_>) -> Result<(i64, i64), LineError> {
    let parts = evaluate_split(text, ',', ctx)
        .map_err(|err| LineError::eval(text, err))?
        .unwrap_or_default();
    let [low, high] = parts.as_slice() else {
        return Err(LineError::MalformedRange {
            text: text.trim().to_string(),
            parts: parts.len().max(1),
        });
    };
    let as_int = |value: &Value| {
        value
            .as_int()
            .ok_or_else(|| LineError::eval(text, EvalError::mismatch("int", value)))
    };
    Ok((as_int(low)?, as_int(high)?))
}

fn sample(low: i64, high: i64, text: &str, ctx: &mut EvalContext<'_>) -> Result<i64, LineError> {
    ctx.randint(low, high)
        .map_err(|err| LineError::eval(text, err))
}

/// Evaluate a declared size: the length to synthesize and the bound an
/// asserted value must satisfy. `None` when no size was written.
fn resolve_size(
    size: &SizeExpr,
    ctx: &mut EvalContext<'_>,
) -> Result<Option<(usize, SizeBound)>, LineError> {
    match size {
        SizeExpr::Exact(expression) if expression.trim().is_empty() => Ok(None),
        SizeExpr::Exact(expression) => {
            let value = eval_text(expression, ctx)?;
            let len = bounded(non_negative(&value, expression)?, expression)?;
            Ok(Some((len, SizeBound::Exactly(len))))
        }
        SizeExpr::Range(inner) => {
            let (low, high) = range_bounds(inner, ctx)?;
            let sampled = sample(low, high, inner, ctx)?;
            let invalid = || LineError::InvalidSize {
                expression: size.to_string(),
                value: format!("({low}, {high})"),
            };
            let low = usize::try_from(low).map_err(|_| invalid())?;
            let high = bounded(usize::try_from(high).map_err(|_| invalid())?, inner)?;
            let len = usize::try_from(sampled).map_err(|_| invalid())?;
            Ok(Some((len, SizeBound::Between(low, high))))
        }
    }
}

/// Evaluate `rows, columns`, or `None` when no dimensions were written.
fn resolve_dimensions(
    dims: &str,
    ctx: &mut EvalContext<'_>,
) -> Result<Option<(usize, usize)>, LineError> {
    if dims.trim().is_empty() {
        return Ok(None);
    }
    let parts = evaluate_split(dims, ',', ctx).map_err(|err| LineError::eval(dims, err))?;
    let Some([rows, columns]) = parts.as_deref() else {
        return Err(LineError::MalformedDimensions {
            text: dims.trim().to_string(),
        });
    };
    let (rows, columns) = (non_negative(rows, dims)?, non_negative(columns, dims)?);
    bounded(rows.saturating_mul(columns), dims)?;
    Ok(Some((rows, columns)))
}

fn required(
    declared: Option<(usize, SizeBound)>,
    keyword: &'static str,
) -> Result<usize, LineError> {
    declared
        .map(|(len, _)| len)
        .ok_or(LineError::MissingSize { keyword })
}

fn bounded(len: usize, expression: &str) -> Result<usize, LineError> {
    EvalError::check_len(len).map_err(|err| LineError::eval(expression, err))
}

fn non_negative(value: &Value, expression: &str) -> Result<usize, LineError> {
    value
        .as_int()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| LineError::InvalidSize {
            expression: expression.trim().to_string(),
            value: value.repr(),
        })
}

/// The alphabet from the line's constraint group.
fn alphabet(line: &TemplateLine, keyword: &'static str) -> Result<Vec<char>, LineError> {
    let constraint = line
        .constraint
        .as_ref()
        .ok_or(LineError::MissingAlphabet { keyword })?;
    let chars = expand_alphabet(&constraint.text);
    if chars.is_empty() {
        return Err(LineError::EmptyAlphabet {
            alphabet: constraint.text.clone(),
        });
    }
    Ok(chars)
}

fn random_string(alphabet: &[char], len: usize, ctx: &mut EvalContext<'_>) -> String {
    (0..len).filter_map(|_| ctx.choose(alphabet).copied()).collect()
}

fn into_list(
    value: Value,
    keyword: &'static str,
    expected: &'static str,
) -> Result<Vec<Value>, LineError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(ShapeError::NotCollection {
            keyword,
            expected,
            got: other.type_name(),
        }
        .into()),
    }
}

fn check_length(keyword: &'static str, bound: SizeBound, len: usize) -> Result<(), LineError> {
    if bound.admits(len) {
        Ok(())
    } else {
        Err(ShapeError::Length {
            keyword,
            expected: bound,
            got: len,
        }
        .into())
    }
}

fn index_value(index: usize) -> Value {
    Value::Int(i64::try_from(index).unwrap_or(i64::MAX))
}

fn separator(newline: bool) -> &'static str {
    if newline { "\n" } else { " " }
}

fn join(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
