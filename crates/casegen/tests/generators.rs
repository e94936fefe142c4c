//! Tests for the per-type generators, driven through single-line templates.

use casegen::{
    ErrorKind, EvalError, GenerateError, Generation, Generator, LineError, ShapeError, SizeBound,
    Value, WarningKind,
};

fn run_seeded(seed: u64, body: &str) -> Result<Generation, GenerateError> {
    Generator::builder()
        .seed(seed)
        .build()
        .run_str(&format!("#begin\n{body}\n#end"))
}

fn run(body: &str) -> Generation {
    run_seeded(11, body).unwrap()
}

fn line_error(body: &str) -> LineError {
    match run_seeded(11, body) {
        Err(GenerateError::Line { source, .. }) => source,
        other => panic!("expected a line error, got {other:?}"),
    }
}

fn ints(value: &Value) -> Vec<i64> {
    value
        .as_list()
        .unwrap()
        .iter()
        .map(|item| item.as_int().unwrap())
        .collect()
}

// =========================================================================
// int
// =========================================================================

#[test]
fn int_stays_within_range() {
    for seed in 0..50 {
        let generation = run_seeded(seed, "n[int](1,6)").unwrap();
        let n = generation.scope.lookup("n").unwrap().as_int().unwrap();
        assert!((1..=6).contains(&n), "{n} out of range");
        assert_eq!(generation.output, format!("{n} "));
    }
}

#[test]
fn int_range_may_use_earlier_variables() {
    for seed in 0..20 {
        let generation = run_seeded(seed, "a[int](5,5)\nb[int](a, a * 2)").unwrap();
        let b = generation.scope.lookup("b").unwrap().as_int().unwrap();
        assert!((5..=10).contains(&b));
    }
}

#[test]
fn int_assertion_overrides_range() {
    let generation = run("n[int](1,2)@2 ** 10@");
    assert_eq!(generation.output, "1024 ");
    assert_eq!(generation.scope.lookup("n"), Some(&Value::Int(1024)));
}

#[test]
fn int_without_range_is_zero_with_warning() {
    let generation = run("n[int]$");
    assert_eq!(generation.output, "0\n");
    assert_eq!(generation.warnings.len(), 1);
    assert_eq!(generation.warnings[0].line, 2);
    assert_eq!(
        generation.warnings[0].kind,
        WarningKind::MissingRange { keyword: "int" }
    );
}

#[test]
fn int_empty_range_is_evaluation_error() {
    let err = line_error("n[int](5,1)");
    assert_eq!(err.kind(), ErrorKind::Evaluation);
    assert!(matches!(
        err,
        LineError::Eval {
            source: EvalError::EmptyRange { low: 5, high: 1 },
            ..
        }
    ));
}

#[test]
fn int_range_needs_two_parts() {
    assert_eq!(
        line_error("n[int](1,2,3)"),
        LineError::MalformedRange {
            text: "1,2,3".to_string(),
            parts: 3,
        }
    );
    assert_eq!(
        line_error("n[int]()"),
        LineError::MalformedRange {
            text: String::new(),
            parts: 1,
        }
    );
}

#[test]
fn int_range_bound_must_be_integer() {
    let err = line_error("n[int](1, 'x')");
    assert!(matches!(
        err,
        LineError::Eval {
            source: EvalError::TypeMismatch { expected: "int", got: "str" },
            ..
        }
    ));
}

// =========================================================================
// intlist
// =========================================================================

#[test]
fn intlist_has_declared_length_and_range() {
    for seed in 0..30 {
        let generation = run_seeded(seed, "xs[intlist 5](0,9)").unwrap();
        let xs = ints(generation.scope.lookup("xs").unwrap());
        assert_eq!(xs.len(), 5);
        assert!(xs.iter().all(|x| (0..=9).contains(x)));
        let rendered: Vec<String> = xs.iter().map(ToString::to_string).collect();
        assert_eq!(generation.output, format!("{} ", rendered.join(" ")));
    }
}

#[test]
fn intlist_size_from_earlier_variable() {
    let generation = run("n[int](4,4)\nxs[intlist n](0,0)");
    assert_eq!(generation.output, "4 0 0 0 0 ");
}

#[test]
fn intlist_size_range_is_sampled() {
    for seed in 0..30 {
        let generation = run_seeded(seed, "xs[intlist (2,4)](7,7)").unwrap();
        let len = generation.scope.lookup("xs").unwrap().len().unwrap();
        assert!((2..=4).contains(&len));
    }
}

#[test]
fn intlist_dollar_joins_with_newlines() {
    assert_eq!(run("xs[intlist$ 3](1,1)$").output, "1\n1\n1\n");
}

#[test]
fn intlist_single_assertion_binds_index() {
    assert_eq!(run("xs[intlist 4]@i * i@").output, "0 1 4 9 ");
}

#[test]
fn intlist_double_assertion_supplies_whole_list() {
    let generation = run("xs[intlist 3]@@[3, 2, 1]@@");
    assert_eq!(generation.output, "3 2 1 ");
    assert_eq!(ints(generation.scope.lookup("xs").unwrap()), vec![3, 2, 1]);
}

#[test]
fn intlist_double_assertion_length_is_checked() {
    let err = line_error("xs[intlist 2]@@[1]@@");
    assert_eq!(err.kind(), ErrorKind::Shape);
    assert_eq!(
        err,
        LineError::Shape(ShapeError::Length {
            keyword: "intlist",
            expected: SizeBound::Exactly(2),
            got: 1,
        })
    );
}

#[test]
fn intlist_range_size_bounds_asserted_length() {
    assert_eq!(run("xs[intlist (1,3)]@@[1, 2]@@").output, "1 2 ");
    assert_eq!(
        line_error("xs[intlist (1,3)]@@[1, 2, 3, 4]@@"),
        LineError::Shape(ShapeError::Length {
            keyword: "intlist",
            expected: SizeBound::Between(1, 3),
            got: 4,
        })
    );
}

#[test]
fn intlist_double_assertion_must_be_list() {
    assert_eq!(
        line_error("xs[intlist 1]@@5@@"),
        LineError::Shape(ShapeError::NotCollection {
            keyword: "intlist",
            expected: "list",
            got: "int",
        })
    );
}

#[test]
fn intlist_negative_size_is_invalid() {
    assert_eq!(
        line_error("xs[intlist -1](0,1)"),
        LineError::InvalidSize {
            expression: "-1".to_string(),
            value: "-1".to_string(),
        }
    );
}

#[test]
fn intlist_without_range_is_empty_with_warning() {
    let generation = run("xs[intlist 0]");
    assert_eq!(generation.output, " ");
    assert_eq!(
        generation.warnings[0].kind,
        WarningKind::MissingRange { keyword: "intlist" }
    );
}

#[test]
fn intlist_without_size_is_parse_error() {
    let err = line_error("xs[intlist](0,9)");
    assert_eq!(err, LineError::MissingSize { keyword: "intlist" });
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn intlist_double_assertion_needs_no_size() {
    let generation = run("v[intlist]@@[1, 2, 3]@@$");
    assert_eq!(generation.output, "1 2 3\n");
    assert_eq!(ints(generation.scope.lookup("v").unwrap()), vec![1, 2, 3]);
    assert_eq!(
        line_error("v[intlist]@i@"),
        LineError::MissingSize { keyword: "intlist" }
    );
}

#[test]
fn intlist_size_above_limit_is_rejected() {
    let err = line_error("v[intlist 10**17](0,1)");
    assert_eq!(err.kind(), ErrorKind::Evaluation);
    assert!(matches!(
        err,
        LineError::Eval {
            source: EvalError::TooLarge { .. },
            ..
        }
    ));
}

// =========================================================================
// intmatrix
// =========================================================================

#[test]
fn intmatrix_has_declared_shape() {
    for seed in 0..20 {
        let generation = run_seeded(seed, "m[intmatrix 3, 2](0,9)$").unwrap();
        let rows: Vec<&str> = generation.output.trim_end().split('\n').collect();
        assert_eq!(rows.len(), 3);
        for row in rows {
            let cells: Vec<i64> = row.split(' ').map(|c| c.parse().unwrap()).collect();
            assert_eq!(cells.len(), 2);
            assert!(cells.iter().all(|c| (0..=9).contains(c)));
        }
        let value = generation.scope.lookup("m").unwrap();
        assert_eq!(value.len(), Some(3));
        assert!(value.as_list().unwrap().iter().all(|row| row.len() == Some(2)));
    }
}

#[test]
fn intmatrix_assertion_binds_row_and_column() {
    assert_eq!(run("m[intmatrix 2,2]@i * 10 + j@").output, "0 1\n10 11 ");
}

#[test]
fn intmatrix_double_assertion_checks_rows() {
    assert_eq!(run("m[intmatrix 2,2]@@[[1,2],[3,4]]@@$").output, "1 2\n3 4\n");
    assert_eq!(
        line_error("m[intmatrix 2,2]@@[[1,2]]@@"),
        LineError::Shape(ShapeError::Rows {
            expected: 2,
            got: 1,
        })
    );
}

#[test]
fn intmatrix_double_assertion_checks_every_row() {
    assert_eq!(
        line_error("m[intmatrix 2,2]@@[[1,2],[3]]@@"),
        LineError::Shape(ShapeError::Columns {
            row: 1,
            expected: 2,
            got: 1,
        })
    );
}

#[test]
fn intmatrix_rows_must_be_lists() {
    assert!(matches!(
        line_error("m[intmatrix 1,1]@@[1]@@"),
        LineError::Shape(ShapeError::NotCollection { got: "int", .. })
    ));
}

#[test]
fn intmatrix_needs_two_dimensions() {
    assert_eq!(
        line_error("m[intmatrix 3](0,1)"),
        LineError::MalformedDimensions {
            text: "3".to_string(),
        }
    );
    assert_eq!(
        line_error("m[intmatrix](0,1)"),
        LineError::MissingSize {
            keyword: "intmatrix",
        }
    );
}

#[test]
fn intmatrix_double_assertion_needs_no_dimensions() {
    let generation = run("m[intmatrix]@@[[1, 2], [3, 4], [5]]@@$");
    assert_eq!(generation.output, "1 2\n3 4\n5\n");
    assert_eq!(
        line_error("m[intmatrix]@i + j@"),
        LineError::MissingSize {
            keyword: "intmatrix",
        }
    );
}

#[test]
fn intmatrix_cell_count_above_limit_is_rejected() {
    assert!(matches!(
        line_error("m[intmatrix 100000, 100000](0,1)"),
        LineError::Eval {
            source: EvalError::TooLarge { .. },
            ..
        }
    ));
}

// =========================================================================
// str
// =========================================================================

#[test]
fn str_uses_declared_length_and_alphabet() {
    for seed in 0..30 {
        let generation = run_seeded(seed, "s[str 8](abc)").unwrap();
        let s = generation.scope.lookup("s").unwrap().as_str().unwrap().to_string();
        assert_eq!(s.chars().count(), 8);
        assert!(s.chars().all(|c| "abc".contains(c)));
    }
}

#[test]
fn str_alphabet_shorthands() {
    for seed in 0..10 {
        let generation = run_seeded(seed, "s[str 12](0-9)").unwrap();
        let s = generation.scope.lookup("s").unwrap().as_str().unwrap().to_string();
        assert!(s.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn str_length_range_is_sampled() {
    for seed in 0..30 {
        let generation = run_seeded(seed, "s[str (2,5)](xy)").unwrap();
        let len = generation.scope.lookup("s").unwrap().len().unwrap();
        assert!((2..=5).contains(&len));
    }
}

#[test]
fn str_assertion_supplies_value() {
    assert_eq!(run("s[str]@'ab' * 2@").output, "abab ");
}

#[test]
fn str_assertion_length_is_checked_against_size() {
    assert_eq!(run("s[str 2]@'ab'@").output, "ab ");
    assert_eq!(
        line_error("s[str 3]@'ab'@"),
        LineError::Shape(ShapeError::Length {
            keyword: "str",
            expected: SizeBound::Exactly(3),
            got: 2,
        })
    );
}

#[test]
fn str_requires_size_without_assertion() {
    assert_eq!(
        line_error("s[str](a-z)"),
        LineError::MissingSize { keyword: "str" }
    );
}

#[test]
fn str_requires_alphabet() {
    assert_eq!(
        line_error("s[str 3]"),
        LineError::MissingAlphabet { keyword: "str" }
    );
    assert_eq!(
        line_error("s[str 3]()"),
        LineError::EmptyAlphabet {
            alphabet: String::new(),
        }
    );
}

// =========================================================================
// strlist
// =========================================================================

#[test]
fn strlist_elements_respect_maximum_length() {
    for seed in 0..30 {
        let generation = run_seeded(seed, "ws[strlist 4,5](a-z)").unwrap();
        let words = generation.scope.lookup("ws").unwrap().as_list().unwrap().to_vec();
        assert_eq!(words.len(), 4);
        for word in words {
            let word = word.as_str().unwrap().to_string();
            assert!((1..=5).contains(&word.chars().count()));
            assert!(word.chars().all(|c| c.is_ascii_lowercase()));
        }
    }
}

#[test]
fn strlist_dollar_joins_with_newlines() {
    assert_eq!(run("ws[strlist$ 3,1](q)$").output, "q\nq\nq\n");
}

#[test]
fn strlist_single_assertion_binds_index() {
    assert_eq!(run("ws[strlist 3]@'w' + str(i)@").output, "w0 w1 w2 ");
}

#[test]
fn strlist_double_assertion_length_is_checked() {
    assert_eq!(run("ws[strlist 2]@@['a', 'b']@@").output, "a b ");
    assert!(matches!(
        line_error("ws[strlist 2]@@['a']@@"),
        LineError::Shape(ShapeError::Length { keyword: "strlist", .. })
    ));
}

#[test]
fn strlist_requires_element_length() {
    assert_eq!(
        line_error("ws[strlist 3](a-z)"),
        LineError::MissingSize { keyword: "strlist" }
    );
}

#[test]
fn strlist_double_assertion_needs_no_size() {
    let generation = run("ws[strlist]@@['a', 'bc']@@$");
    assert_eq!(generation.output, "a\nbc\n");
    assert_eq!(
        generation.scope.lookup("ws"),
        Some(&Value::List(vec![
            Value::Str("a".to_string()),
            Value::Str("bc".to_string()),
        ]))
    );
}

#[test]
fn strlist_total_characters_are_limited() {
    assert!(matches!(
        line_error("ws[strlist 10000, 10000](a-z)"),
        LineError::Eval {
            source: EvalError::TooLarge { .. },
            ..
        }
    ));
}
