//! Expression parser using winnow.
//!
//! Parses the small Python-flavoured expression language used inside
//! template lines: sizes, ranges, assertions. Precedence, loosest first:
//! conditional, `or`, `and`, `not`, comparisons, `+ -`, `* / // %`,
//! unary sign, `**`, subscripts.

use super::ast::{BinaryOp, CompareOp, Expr, UnaryOp};
use super::error::ParseError;
use super::escape::unescape;
use winnow::combinator::cut_err;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Words that can never be used as names.
const KEYWORDS: [&str; 9] = ["and", "or", "not", "if", "else", "for", "in", "True", "False"];

/// Parse an expression string into an AST.
///
/// ```
/// use casegen::parser::{parse_expression, Expr};
///
/// assert_eq!(parse_expression("42").unwrap(), Expr::Int(42));
/// assert!(parse_expression("1 +").is_err());
/// ```
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let mut remaining = input;
    let result = ws(&mut remaining).and_then(|()| expression(&mut remaining));
    match (result, remaining.chars().next()) {
        (Ok(expr), None) => Ok(expr),
        (_, None) => Err(ParseError::UnexpectedEof {
            column: calculate_column(input, remaining),
        }),
        (_, Some(c)) => Err(ParseError::Syntax {
            column: calculate_column(input, remaining),
            message: format!("unexpected character: '{c}'"),
        }),
    }
}

/// Calculate the 1-based character column of `remaining` within `original`.
fn calculate_column(original: &str, remaining: &str) -> usize {
    let consumed = original.len() - remaining.len();
    original[..consumed].chars().count() + 1
}

fn cut<T>() -> ModalResult<T> {
    Err(ErrMode::Cut(ContextError::new()))
}

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Consume `symbol` and trailing whitespace if it is next.
fn eat(input: &mut &str, symbol: &str) -> bool {
    match input.strip_prefix(symbol) {
        Some(rest) => {
            *input = rest.trim_start();
            true
        }
        None => false,
    }
}

/// Consume `word` if it is the next whole word.
fn eat_keyword(input: &mut &str, word: &str) -> bool {
    match input.strip_prefix(word) {
        Some(rest) if !rest.starts_with(is_ident_cont) => {
            *input = rest.trim_start();
            true
        }
        _ => false,
    }
}

/// Consume a required closing symbol.
fn expect(input: &mut &str, symbol: &str) -> ModalResult<()> {
    if eat(input, symbol) { Ok(()) } else { cut() }
}

/// `or_test ['if' or_test 'else' expression]`
fn expression(input: &mut &str) -> ModalResult<Expr> {
    let then = or_test(input)?;
    if !eat_keyword(input, "if") {
        return Ok(then);
    }
    let condition = cut_err(or_test).parse_next(input)?;
    if !eat_keyword(input, "else") {
        return cut();
    }
    let otherwise = cut_err(expression).parse_next(input)?;
    Ok(Expr::Conditional {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

fn or_test(input: &mut &str) -> ModalResult<Expr> {
    let mut left = and_test(input)?;
    while eat_keyword(input, "or") {
        let right = cut_err(and_test).parse_next(input)?;
        left = Expr::Or(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn and_test(input: &mut &str) -> ModalResult<Expr> {
    let mut left = not_test(input)?;
    while eat_keyword(input, "and") {
        let right = cut_err(not_test).parse_next(input)?;
        left = Expr::And(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn not_test(input: &mut &str) -> ModalResult<Expr> {
    if eat_keyword(input, "not") {
        let operand = cut_err(not_test).parse_next(input)?;
        return Ok(Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        });
    }
    comparison(input)
}

/// `arith (compare_op arith)*`, kept as a chain like `a < b < c`.
fn comparison(input: &mut &str) -> ModalResult<Expr> {
    let first = arith(input)?;
    let mut rest = Vec::new();
    while let Some(op) = compare_op(input) {
        let operand = cut_err(arith).parse_next(input)?;
        rest.push((op, operand));
    }
    if rest.is_empty() {
        Ok(first)
    } else {
        Ok(Expr::Compare {
            first: Box::new(first),
            rest,
        })
    }
}

fn compare_op(input: &mut &str) -> Option<CompareOp> {
    const SYMBOLS: [(&str, CompareOp); 6] = [
        ("==", CompareOp::Eq),
        ("!=", CompareOp::Ne),
        ("<=", CompareOp::Le),
        (">=", CompareOp::Ge),
        ("<", CompareOp::Lt),
        (">", CompareOp::Gt),
    ];
    for (symbol, op) in SYMBOLS {
        if eat(input, symbol) {
            return Some(op);
        }
    }
    if eat_keyword(input, "in") {
        return Some(CompareOp::In);
    }
    let checkpoint = *input;
    if eat_keyword(input, "not") {
        if eat_keyword(input, "in") {
            return Some(CompareOp::NotIn);
        }
        *input = checkpoint;
    }
    None
}

fn arith(input: &mut &str) -> ModalResult<Expr> {
    let mut left = term(input)?;
    loop {
        let op = if eat(input, "+") {
            BinaryOp::Add
        } else if eat(input, "-") {
            BinaryOp::Sub
        } else {
            break;
        };
        let right = cut_err(term).parse_next(input)?;
        left = binary(op, left, right);
    }
    Ok(left)
}

fn term(input: &mut &str) -> ModalResult<Expr> {
    let mut left = factor(input)?;
    loop {
        let op = if eat(input, "//") {
            BinaryOp::FloorDiv
        } else if eat(input, "/") {
            BinaryOp::Div
        } else if eat(input, "%") {
            BinaryOp::Mod
        } else if eat(input, "*") {
            BinaryOp::Mul
        } else {
            break;
        };
        let right = cut_err(factor).parse_next(input)?;
        left = binary(op, left, right);
    }
    Ok(left)
}

/// Unary sign binds looser than `**`: `-2**2` is `-(2**2)`.
fn factor(input: &mut &str) -> ModalResult<Expr> {
    let op = if eat(input, "-") {
        UnaryOp::Neg
    } else if eat(input, "+") {
        UnaryOp::Pos
    } else {
        return power(input);
    };
    let operand = cut_err(factor).parse_next(input)?;
    Ok(Expr::Unary {
        op,
        operand: Box::new(operand),
    })
}

/// Right-associative: `2**3**2` is `2**(3**2)`.
fn power(input: &mut &str) -> ModalResult<Expr> {
    let base = postfix(input)?;
    if !eat(input, "**") {
        return Ok(base);
    }
    let exponent = cut_err(factor).parse_next(input)?;
    Ok(binary(BinaryOp::Pow, base, exponent))
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// An atom followed by any number of `[index]` / `[start:end]` subscripts.
fn postfix(input: &mut &str) -> ModalResult<Expr> {
    let mut target = atom(input)?;
    while eat(input, "[") {
        target = subscript(input, target)?;
    }
    Ok(target)
}

/// Parse the inside of a subscript after its opening `[`.
fn subscript(input: &mut &str, target: Expr) -> ModalResult<Expr> {
    let start = if input.starts_with(':') {
        None
    } else {
        Some(cut_err(expression).parse_next(input)?)
    };
    if eat(input, ":") {
        let end = if input.starts_with(']') {
            None
        } else {
            Some(cut_err(expression).parse_next(input)?)
        };
        expect(input, "]")?;
        return Ok(Expr::Slice {
            target: Box::new(target),
            start: start.map(Box::new),
            end: end.map(Box::new),
        });
    }
    expect(input, "]")?;
    match start {
        Some(index) => Ok(Expr::Index {
            target: Box::new(target),
            index: Box::new(index),
        }),
        None => cut(),
    }
}

fn atom(input: &mut &str) -> ModalResult<Expr> {
    match input.chars().next() {
        Some('(') => parenthesized(input),
        Some('[') => list_display(input),
        Some('\'' | '"') => string_literal(input),
        Some(c) if c.is_ascii_digit() => integer(input),
        Some(c) if is_ident_start(c) => name_or_call(input),
        _ => backtrack(),
    }
}

/// Parse an integer literal. Underscores are allowed as digit separators.
fn integer(input: &mut &str) -> ModalResult<Expr> {
    let digits: &str =
        take_while(1.., |c: char| c.is_ascii_digit() || c == '_').parse_next(input)?;
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    let Ok(value) = cleaned.parse::<i64>() else {
        return cut();
    };
    ws(input)?;
    Ok(Expr::Int(value))
}

/// Parse a quoted string literal: `'...'` or `"..."`.
fn string_literal(input: &mut &str) -> ModalResult<Expr> {
    let mut chars = input.char_indices();
    let Some((_, quote)) = chars.next() else {
        return backtrack();
    };
    let mut escaped = false;
    let end = chars.find_map(|(index, c)| {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(index);
        }
        None
    });
    let Some(end) = end else {
        *input = "";
        return cut();
    };
    let body = unescape(&input[1..end]);
    *input = input[end + 1..].trim_start();
    Ok(Expr::Str(body))
}

/// A bare name, a boolean literal, or a builtin call `name(args)`.
fn name_or_call(input: &mut &str) -> ModalResult<Expr> {
    let checkpoint = *input;
    let name = identifier(input)?;
    match name {
        "True" => return finish(input, Expr::Bool(true)),
        "False" => return finish(input, Expr::Bool(false)),
        word if KEYWORDS.contains(&word) => {
            *input = checkpoint;
            return backtrack();
        }
        _ => {}
    }
    ws(input)?;
    if !eat(input, "(") {
        return Ok(Expr::Name(name.to_string()));
    }
    let mut args = Vec::new();
    while !eat(input, ")") {
        args.push(cut_err(expression).parse_next(input)?);
        if !eat(input, ",") {
            expect(input, ")")?;
            break;
        }
    }
    Ok(Expr::Call {
        function: name.to_string(),
        args,
    })
}

fn finish(input: &mut &str, expr: Expr) -> ModalResult<Expr> {
    ws(input)?;
    Ok(expr)
}

/// `()`, `(expr)` or a tuple `(a, b, ...)`.
fn parenthesized(input: &mut &str) -> ModalResult<Expr> {
    expect(input, "(")?;
    if eat(input, ")") {
        return Ok(Expr::Tuple(Vec::new()));
    }
    let first = cut_err(expression).parse_next(input)?;
    if !eat(input, ",") {
        expect(input, ")")?;
        return Ok(first);
    }
    let mut items = vec![first];
    while !eat(input, ")") {
        items.push(cut_err(expression).parse_next(input)?);
        if !eat(input, ",") {
            expect(input, ")")?;
            break;
        }
    }
    Ok(Expr::Tuple(items))
}

/// `[a, b, ...]` or `[element for var in iterable if condition]`.
fn list_display(input: &mut &str) -> ModalResult<Expr> {
    expect(input, "[")?;
    if eat(input, "]") {
        return Ok(Expr::List(Vec::new()));
    }
    let first = cut_err(expression).parse_next(input)?;

    if eat_keyword(input, "for") {
        let Ok(var) = identifier(input) else {
            return cut();
        };
        let var = var.to_string();
        ws(input)?;
        if KEYWORDS.contains(&var.as_str()) || !eat_keyword(input, "in") {
            return cut();
        }
        let iterable = cut_err(or_test).parse_next(input)?;
        let condition = if eat_keyword(input, "if") {
            Some(Box::new(cut_err(or_test).parse_next(input)?))
        } else {
            None
        };
        expect(input, "]")?;
        return Ok(Expr::Comprehension {
            element: Box::new(first),
            var,
            iterable: Box::new(iterable),
            condition,
        });
    }

    let mut items = vec![first];
    while eat(input, ",") {
        if input.starts_with(']') {
            break;
        }
        items.push(cut_err(expression).parse_next(input)?);
    }
    expect(input, "]")?;
    Ok(Expr::List(items))
}

/// Parse an identifier.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_ident_cont).parse_next(input)
}

/// Check if a character can start an identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
pub(crate) fn is_ident_cont(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
