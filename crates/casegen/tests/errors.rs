//! Tests for error classification, messages and suggestions.

use casegen::parser::ParseError;
use casegen::{
    ErrorKind, EvalError, GenerateError, GenerateWarning, LineError, ShapeError, SizeBound,
    WarningKind, compute_suggestions,
};

fn names(candidates: &[&str]) -> Vec<String> {
    candidates.iter().map(|c| (*c).to_string()).collect()
}

// =========================================================================
// Suggestions
// =========================================================================

#[test]
fn suggestions_within_distance() {
    let available = names(&["count", "amount", "x"]);
    assert_eq!(compute_suggestions("cout", &available), vec!["count"]);
}

#[test]
fn short_names_allow_one_edit() {
    let available = names(&["n", "m", "nm", "abc"]);
    assert_eq!(compute_suggestions("nn", &available), vec!["n", "nm"]);
}

#[test]
fn suggestions_are_capped_at_three() {
    let available = names(&["abcg", "abce", "abch", "abcf"]);
    assert_eq!(
        compute_suggestions("abcd", &available),
        vec!["abce", "abcf", "abcg"]
    );
}

#[test]
fn closer_suggestions_come_first() {
    let available = names(&["lenght", "len"]);
    assert_eq!(compute_suggestions("lent", &available), vec!["len", "lenght"]);
}

#[test]
fn duplicate_candidates_are_suggested_once() {
    let available = names(&["abd", "abd"]);
    assert_eq!(compute_suggestions("abc", &available), vec!["abd"]);
}

#[test]
fn no_suggestions_when_nothing_is_close() {
    let available = names(&["alpha", "beta"]);
    assert!(compute_suggestions("zzz", &available).is_empty());
}

// =========================================================================
// Classification
// =========================================================================

#[test]
fn line_error_kinds() {
    assert_eq!(
        LineError::MissingSize { keyword: "str" }.kind(),
        ErrorKind::Parse
    );
    assert_eq!(
        LineError::InvalidSize {
            expression: "n".to_string(),
            value: "-2".to_string(),
        }
        .kind(),
        ErrorKind::Evaluation
    );
    assert_eq!(
        LineError::Shape(ShapeError::Rows {
            expected: 2,
            got: 3,
        })
        .kind(),
        ErrorKind::Shape
    );
}

#[test]
fn generate_error_inherits_line_kind() {
    let err = GenerateError::Line {
        number: 4,
        text: "s[str](a-z)".to_string(),
        source: LineError::MissingSize { keyword: "str" },
    };
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.line_number(), Some(4));
}

// =========================================================================
// Messages
// =========================================================================

#[test]
fn generate_error_shows_line_and_text() {
    let err = GenerateError::Line {
        number: 4,
        text: "s[str](a-z)".to_string(),
        source: LineError::MissingSize { keyword: "str" },
    };
    assert_eq!(err.to_string(), "line 4: [str] requires a size\n> s[str](a-z)");
}

#[test]
fn eval_error_message_wraps_cause() {
    let err = LineError::Eval {
        expression: "n".to_string(),
        source: EvalError::UndefinedName {
            name: "n".to_string(),
            suggestions: vec![],
        },
    };
    insta::assert_snapshot!(err.to_string(), @"failed to evaluate 'n': name 'n' is not defined");
}

#[test]
fn unknown_function_lists_suggestions() {
    let err = EvalError::UnknownFunction {
        name: "mx".to_string(),
        suggestions: names(&["max", "min"]),
    };
    insta::assert_snapshot!(err.to_string(), @"unknown function 'mx'; did you mean: max, min?");
}

#[test]
fn too_large_names_the_limit() {
    let err = EvalError::TooLarge { len: 20_000_000 };
    insta::assert_snapshot!(
        err.to_string(),
        @"sequence of length 20000000 exceeds the limit of 10000000"
    );
    assert_eq!(casegen::MAX_SEQUENCE_LEN, 10_000_000);
}

#[test]
fn shape_messages() {
    insta::assert_snapshot!(
        ShapeError::Length {
            keyword: "intlist",
            expected: SizeBound::Between(1, 3),
            got: 4,
        }
        .to_string(),
        @"[intlist] expected between 1 and 3 elements, got 4"
    );
    insta::assert_snapshot!(
        ShapeError::Columns {
            row: 1,
            expected: 2,
            got: 1,
        }
        .to_string(),
        @"[intmatrix] row 1 expected 2 columns, got 1"
    );
}

#[test]
fn parse_errors_inside_eval_errors() {
    let err = EvalError::from(ParseError::Syntax {
        column: 3,
        message: "unexpected character: '2'".to_string(),
    });
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid expression: syntax error at column 3: unexpected character: '2'"
    );
    assert_eq!(ParseError::Empty.column(), None);
    assert_eq!(ParseError::UnexpectedEof { column: 4 }.column(), Some(4));
}

#[test]
fn warning_messages() {
    let warning = GenerateWarning {
        line: 7,
        kind: WarningKind::MissingRange { keyword: "intlist" },
    };
    insta::assert_snapshot!(warning.to_string(), @"line 7: [intlist] has no (low,high) range");
    insta::assert_snapshot!(WarningKind::NoType.to_string(), @"no [type] found, line skipped");
    insta::assert_snapshot!(
        WarningKind::UnknownType {
            declared: "float".to_string(),
            suggestion: None,
        }
        .to_string(),
        @"unknown type '[float]', line skipped"
    );
}

// =========================================================================
// Size bounds
// =========================================================================

#[test]
fn size_bounds_admit_lengths() {
    assert!(SizeBound::Exactly(3).admits(3));
    assert!(!SizeBound::Exactly(3).admits(2));
    assert!(SizeBound::Between(1, 3).admits(1));
    assert!(SizeBound::Between(1, 3).admits(3));
    assert!(!SizeBound::Between(1, 3).admits(0));
    assert_eq!(SizeBound::Exactly(5).to_string(), "5");
}
