//! Builtin functions callable from template expressions.

use std::cmp::Ordering;

use crate::interpreter::error::compute_suggestions;
use crate::interpreter::evaluator::{iterate, order};
use crate::interpreter::{EvalContext, EvalError};
use crate::types::Value;

/// Names of every builtin, in the order they are documented.
pub const BUILTINS: &[&str] = &[
    "len", "range", "min", "max", "abs", "sum", "sorted", "reversed", "list", "str", "int",
    "chr", "ord", "randint", "choice",
];

/// Dispatch a builtin call with already-evaluated arguments.
pub(crate) fn call_builtin(
    name: &str,
    args: Vec<Value>,
    ctx: &mut EvalContext<'_>,
) -> Result<Value, EvalError> {
    match name {
        "len" => {
            let [value] = exactly::<1>(name, args)?;
            let len = value
                .len()
                .ok_or_else(|| EvalError::mismatch("list or str", &value))?;
            to_int(len)
        }
        "range" => range(args),
        "min" => extreme(name, args, Ordering::Less),
        "max" => extreme(name, args, Ordering::Greater),
        "abs" => {
            let [value] = exactly::<1>(name, args)?;
            let n = int_arg(&value)?;
            n.checked_abs().map(Value::Int).ok_or(EvalError::Overflow)
        }
        "sum" => sum(args),
        "sorted" => {
            let [value] = exactly::<1>(name, args)?;
            sorted(iterate(&value)?).map(Value::List)
        }
        "reversed" => {
            let [value] = exactly::<1>(name, args)?;
            let mut items = iterate(&value)?;
            items.reverse();
            Ok(Value::List(items))
        }
        "list" => {
            let [value] = exactly::<1>(name, args)?;
            iterate(&value).map(Value::List)
        }
        "str" => {
            let [value] = exactly::<1>(name, args)?;
            Ok(Value::Str(value.to_string()))
        }
        "int" => {
            let [value] = exactly::<1>(name, args)?;
            parse_int(&value).map(Value::Int)
        }
        "chr" => {
            let [value] = exactly::<1>(name, args)?;
            let code = int_arg(&value)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| EvalError::InvalidArgument {
                    function: "chr",
                    message: format!("{code} is not a valid code point"),
                })
        }
        "ord" => {
            let [value] = exactly::<1>(name, args)?;
            let text = value
                .as_str()
                .ok_or_else(|| EvalError::mismatch("str", &value))?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                _ => Err(EvalError::InvalidArgument {
                    function: "ord",
                    message: format!("expected a single character, got {}", value.repr()),
                }),
            }
        }
        "randint" => {
            let [low, high] = exactly::<2>(name, args)?;
            ctx.randint(int_arg(&low)?, int_arg(&high)?).map(Value::Int)
        }
        "choice" => {
            let [value] = exactly::<1>(name, args)?;
            let items = iterate(&value)?;
            ctx.choose(&items)
                .cloned()
                .ok_or(EvalError::EmptySequence { function: "choice" })
        }
        unknown => {
            let available: Vec<String> = BUILTINS.iter().map(|b| (*b).to_string()).collect();
            Err(EvalError::UnknownFunction {
                name: unknown.to_string(),
                suggestions: compute_suggestions(unknown, &available),
            })
        }
    }
}

fn exactly<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], EvalError> {
    let got = args.len();
    args.try_into().map_err(|_| {
        let expected = match N {
            1 => "1",
            2 => "2",
            _ => "3",
        };
        EvalError::arity(name, expected, got)
    })
}

fn int_arg(value: &Value) -> Result<i64, EvalError> {
    value.as_int().ok_or_else(|| EvalError::mismatch("int", value))
}

fn to_int(n: usize) -> Result<Value, EvalError> {
    i64::try_from(n).map(Value::Int).map_err(|_| EvalError::Overflow)
}

fn parse_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Str(text) => text
            .trim()
            .replace('_', "")
            .parse()
            .map_err(|_| EvalError::InvalidArgument {
                function: "int",
                message: format!("invalid literal {}", value.repr()),
            }),
        other => int_arg(other),
    }
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`.
fn range(args: Vec<Value>) -> Result<Value, EvalError> {
    let bounds = args.iter().map(int_arg).collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match bounds.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(EvalError::arity("range", "1 to 3", args.len())),
    };
    if step == 0 {
        return Err(EvalError::InvalidArgument {
            function: "range",
            message: "step must not be zero".to_string(),
        });
    }

    let span = if step > 0 {
        i128::from(stop) - i128::from(start)
    } else {
        i128::from(start) - i128::from(stop)
    };
    let count = if span <= 0 {
        0
    } else {
        let step = i128::from(step).abs();
        (span + step - 1).div_euclid(step)
    };
    EvalError::check_len(usize::try_from(count).map_err(|_| EvalError::Overflow)?)?;

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::List(items))
}

/// `min`/`max` over one iterable argument or over several arguments.
fn extreme(name: &str, args: Vec<Value>, wanted: Ordering) -> Result<Value, EvalError> {
    let function = if wanted == Ordering::Less { "min" } else { "max" };
    let items = match args.len() {
        0 => return Err(EvalError::arity(name, "at least 1", 0)),
        1 => iterate(&args[0])?,
        _ => args,
    };

    let mut best: Option<Value> = None;
    for item in items {
        best = Some(match best {
            None => item,
            Some(current) => {
                let ordering = order(&item, &current).ok_or(EvalError::OperandTypes {
                    op: if wanted == Ordering::Less { "<" } else { ">" },
                    left: item.type_name(),
                    right: current.type_name(),
                })?;
                if ordering == wanted { item } else { current }
            }
        });
    }
    best.ok_or(EvalError::EmptySequence { function })
}

/// `sum(items)` or `sum(items, start)`.
fn sum(args: Vec<Value>) -> Result<Value, EvalError> {
    let (items, start) = match args.as_slice() {
        [items] => (items, 0),
        [items, start] => (items, int_arg(start)?),
        _ => return Err(EvalError::arity("sum", "1 or 2", args.len())),
    };
    let items = items
        .as_list()
        .ok_or_else(|| EvalError::mismatch("list", items))?;
    items
        .iter()
        .try_fold(start, |total, item| {
            total.checked_add(int_arg(item)?).ok_or(EvalError::Overflow)
        })
        .map(Value::Int)
}

fn sorted(mut items: Vec<Value>) -> Result<Vec<Value>, EvalError> {
    let mut incomparable = None;
    items.sort_by(|a, b| {
        order(a, b).unwrap_or_else(|| {
            incomparable.get_or_insert((a.type_name(), b.type_name()));
            Ordering::Equal
        })
    });
    match incomparable {
        Some((left, right)) => Err(EvalError::OperandTypes {
            op: "<",
            left,
            right,
        }),
        None => Ok(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_handles_negative_steps() {
        let value = range(vec![Value::Int(5), Value::Int(0), Value::Int(-2)]).unwrap();
        assert_eq!(value, Value::from(vec![5_i64, 3, 1]));
    }

    #[test]
    fn range_rejects_zero_step() {
        let err = range(vec![Value::Int(0), Value::Int(5), Value::Int(0)]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument { function: "range", .. }));
    }

    #[test]
    fn sorted_reports_mixed_types() {
        let err = sorted(vec![Value::Int(1), Value::Str("a".into())]).unwrap_err();
        assert!(matches!(err, EvalError::OperandTypes { op: "<", .. }));
    }

    #[test]
    fn exactly_reports_arity() {
        let err = exactly::<2>("randint", vec![Value::Int(1)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "randint() expects 2 arguments, got 1"
        );
    }
}
