//! Expression evaluation.
//!
//! Walks an expression AST against an [`EvalContext`], producing a
//! [`Value`]. Semantics follow Python where the two overlap: truthiness,
//! short-circuit `and`/`or` returning an operand, negative indices,
//! clamped slices, floor division and modulo rounding toward negative
//! infinity. `/` is floor division as well since there are no floats.

use std::cmp::Ordering;

use crate::interpreter::builtins::call_builtin;
use crate::interpreter::error::compute_suggestions;
use crate::interpreter::{EvalContext, EvalError};
use crate::parser::{BinaryOp, CompareOp, Expr, UnaryOp, parse_expression, split_top_level};
use crate::types::Value;

/// Parse and evaluate an expression string.
///
/// # Errors
///
/// Returns an error if the expression does not parse, references an
/// undefined name, or fails while evaluating (type errors, division by
/// zero, out-of-range index, ...).
///
/// # Example
///
/// ```
/// use casegen::{EvalContext, Scope, Value, evaluate};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut scope = Scope::new();
/// scope.assign("n", Value::Int(4));
/// let mut rng = StdRng::seed_from_u64(0);
/// let mut ctx = EvalContext::new(&scope, &mut rng);
/// assert_eq!(evaluate("n * 2 + 1", &mut ctx).unwrap(), Value::Int(9));
/// ```
pub fn evaluate(expression: &str, ctx: &mut EvalContext<'_>) -> Result<Value, EvalError> {
    let expr = parse_expression(expression)?;
    eval_expr(&expr, ctx)
}

/// Split `expression` on top-level `separator`s and evaluate every part.
///
/// Returns `Ok(None)` when the separator does not occur at the top level,
/// so `(max(a,b), 10)` splits into two parts while `max(a,b)` does not split.
pub fn evaluate_split(
    expression: &str,
    separator: char,
    ctx: &mut EvalContext<'_>,
) -> Result<Option<Vec<Value>>, EvalError> {
    let parts = split_top_level(expression, separator, None);
    if parts.len() < 2 {
        return Ok(None);
    }
    parts
        .into_iter()
        .map(|part| evaluate(part, ctx))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Evaluate a parsed expression.
pub fn eval_expr(expr: &Expr, ctx: &mut EvalContext<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Name(name) => ctx.lookup(name).cloned().ok_or_else(|| {
            let available = ctx.visible_names();
            EvalError::UndefinedName {
                name: name.clone(),
                suggestions: compute_suggestions(name, &available),
            }
        }),
        Expr::List(items) | Expr::Tuple(items) => items
            .iter()
            .map(|item| eval_expr(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Comprehension {
            element,
            var,
            iterable,
            condition,
        } => eval_comprehension(element, var, iterable, condition.as_deref(), ctx),
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, ctx)?;
            eval_unary(*op, &value)
        }
        Expr::Binary { op, left, right } => {
            let left = eval_expr(left, ctx)?;
            let right = eval_expr(right, ctx)?;
            eval_binary(*op, &left, &right)
        }
        Expr::Compare { first, rest } => {
            let mut left = eval_expr(first, ctx)?;
            for (op, operand) in rest {
                let right = eval_expr(operand, ctx)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
        Expr::And(left, right) => {
            let left = eval_expr(left, ctx)?;
            if left.is_truthy() {
                eval_expr(right, ctx)
            } else {
                Ok(left)
            }
        }
        Expr::Or(left, right) => {
            let left = eval_expr(left, ctx)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                eval_expr(right, ctx)
            }
        }
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval_expr(condition, ctx)?.is_truthy() {
                eval_expr(then, ctx)
            } else {
                eval_expr(otherwise, ctx)
            }
        }
        Expr::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| eval_expr(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(function, args, ctx)
        }
        Expr::Index { target, index } => {
            let target = eval_expr(target, ctx)?;
            let index = eval_expr(index, ctx)?;
            eval_index(&target, &index)
        }
        Expr::Slice { target, start, end } => {
            let target = eval_expr(target, ctx)?;
            let start = start
                .as_deref()
                .map(|bound| eval_int(bound, ctx))
                .transpose()?;
            let end = end.as_deref().map(|bound| eval_int(bound, ctx)).transpose()?;
            eval_slice(&target, start, end)
        }
    }
}

fn eval_int(expr: &Expr, ctx: &mut EvalContext<'_>) -> Result<i64, EvalError> {
    let value = eval_expr(expr, ctx)?;
    value.as_int().ok_or_else(|| EvalError::mismatch("int", &value))
}

fn eval_comprehension(
    element: &Expr,
    var: &str,
    iterable: &Expr,
    condition: Option<&Expr>,
    ctx: &mut EvalContext<'_>,
) -> Result<Value, EvalError> {
    let items = iterate(&eval_expr(iterable, ctx)?)?;
    ctx.push_binding(var, Value::Int(0));
    let result = items
        .into_iter()
        .filter_map(|item| {
            ctx.set_innermost(item);
            let keep = match condition {
                Some(condition) => match eval_expr(condition, ctx) {
                    Ok(value) => value.is_truthy(),
                    Err(err) => return Some(Err(err)),
                },
                None => true,
            };
            keep.then(|| eval_expr(element, ctx))
        })
        .collect::<Result<Vec<_>, _>>();
    ctx.pop_binding();
    result.map(Value::List)
}

/// Elements of an iterable value: list items, or the characters of a string.
pub(crate) fn iterate(value: &Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items.clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        other => Err(EvalError::mismatch("list or str", other)),
    }
}

fn eval_unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg | UnaryOp::Pos => {
            let n = value.as_int().ok_or(EvalError::TypeMismatch {
                expected: "int",
                got: value.type_name(),
            })?;
            if op == UnaryOp::Pos {
                return Ok(Value::Int(n));
            }
            n.checked_neg().map(Value::Int).ok_or(EvalError::Overflow)
        }
    }
}

fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let unsupported = || EvalError::OperandTypes {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };

    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            EvalError::check_len(a.len().saturating_add(b.len()))?;
            Ok(Value::Str(format!("{a}{b}")))
        }
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            EvalError::check_len(a.len().saturating_add(b.len()))?;
            Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        (BinaryOp::Mul, Value::Str(s), count) | (BinaryOp::Mul, count, Value::Str(s))
            if count.as_int().is_some() =>
        {
            let times = repeat_count(count);
            let total = s.len().checked_mul(times).ok_or(EvalError::Overflow)?;
            EvalError::check_len(total)?;
            Ok(Value::Str(s.repeat(times)))
        }
        (BinaryOp::Mul, Value::List(items), count) | (BinaryOp::Mul, count, Value::List(items))
            if count.as_int().is_some() =>
        {
            let total = items
                .len()
                .checked_mul(repeat_count(count))
                .ok_or(EvalError::Overflow)?;
            EvalError::check_len(total)?;
            Ok(Value::List(items.iter().cycle().take(total).cloned().collect()))
        }
        _ => {
            let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
                return Err(unsupported());
            };
            int_arithmetic(op, a, b).map(Value::Int)
        }
    }
}

/// Repetition count for `*` on sequences; negative counts repeat zero times.
fn repeat_count(count: &Value) -> usize {
    count
        .as_int()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<i64, EvalError> {
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or(EvalError::Overflow),
        BinaryOp::Sub => a.checked_sub(b).ok_or(EvalError::Overflow),
        BinaryOp::Mul => a.checked_mul(b).ok_or(EvalError::Overflow),
        BinaryOp::Div | BinaryOp::FloorDiv => floor_div(a, b),
        BinaryOp::Mod => floor_mod(a, b),
        BinaryOp::Pow => {
            let exponent = u32::try_from(b).map_err(|_| {
                if b < 0 {
                    EvalError::NegativeExponent(b)
                } else {
                    EvalError::Overflow
                }
            })?;
            a.checked_pow(exponent).ok_or(EvalError::Overflow)
        }
    }
}

/// Division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Result<i64, EvalError> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let quotient = a.checked_div(b).ok_or(EvalError::Overflow)?;
    let remainder = a.checked_rem(b).ok_or(EvalError::Overflow)?;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Remainder taking the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Result<i64, EvalError> {
    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let remainder = a.checked_rem(b).ok_or(EvalError::Overflow)?;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Ok(remainder + b)
    } else {
        Ok(remainder)
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    match op {
        CompareOp::Eq => Ok(values_equal(left, right)),
        CompareOp::Ne => Ok(!values_equal(left, right)),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = order(left, right).ok_or(EvalError::OperandTypes {
                op: op.symbol(),
                left: left.type_name(),
                right: right.type_name(),
            })?;
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

/// Equality where booleans compare equal to the matching integers.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Str(a), Value::Str(b)) => a == b,
        _ => match (left.as_int(), right.as_int()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Total order within a type; `None` for values that cannot be ordered.
pub(crate) fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b) {
                match order(x, y)? {
                    Ordering::Equal => {}
                    unequal => return Some(unequal),
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => Some(left.as_int()?.cmp(&right.as_int()?)),
    }
}

fn contains(container: &Value, needle: &Value) -> Result<bool, EvalError> {
    match (container, needle) {
        (Value::List(items), _) => Ok(items.iter().any(|item| values_equal(item, needle))),
        (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        _ => Err(EvalError::OperandTypes {
            op: "in",
            left: needle.type_name(),
            right: container.type_name(),
        }),
    }
}

/// Resolve a possibly negative index against a length.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len_i } else { index };
    usize::try_from(resolved).ok().filter(|&i| i < len)
}

fn eval_index(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let position = index
        .as_int()
        .ok_or_else(|| EvalError::mismatch("int", index))?;
    let out_of_range = |len| EvalError::IndexOutOfRange {
        index: position,
        len,
    };
    match target {
        Value::List(items) => resolve_index(position, items.len())
            .map(|i| items[i].clone())
            .ok_or_else(|| out_of_range(items.len())),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            resolve_index(position, chars.len())
                .map(|i| Value::Str(chars[i].to_string()))
                .ok_or_else(|| out_of_range(chars.len()))
        }
        other => Err(EvalError::mismatch("list or str", other)),
    }
}

/// Clamp a slice bound the way Python does.
fn clamp_bound(bound: Option<i64>, len: usize, default: usize) -> usize {
    let Some(bound) = bound else {
        return default;
    };
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if bound < 0 { bound + len_i } else { bound };
    usize::try_from(resolved.clamp(0, len_i)).unwrap_or(0)
}

fn eval_slice(target: &Value, start: Option<i64>, end: Option<i64>) -> Result<Value, EvalError> {
    match target {
        Value::List(items) => {
            let from = clamp_bound(start, items.len(), 0);
            let to = clamp_bound(end, items.len(), items.len());
            Ok(Value::List(items.get(from..to.max(from)).unwrap_or_default().to_vec()))
        }
        Value::Str(s) => {
            let len = s.chars().count();
            let from = clamp_bound(start, len, 0);
            let to = clamp_bound(end, len, len).max(from);
            Ok(Value::Str(s.chars().skip(from).take(to - from).collect()))
        }
        other => Err(EvalError::mismatch("list or str", other)),
    }
}
