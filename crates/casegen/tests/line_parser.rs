//! Tests for template line fragment extraction, type declarations and
//! section markers.

use casegen::parser::{
    Assertion, SizeExpr, TypeSpec, active_lines, parse_line, split_top_level,
};

// =========================================================================
// Fragments
// =========================================================================

#[test]
fn full_declaration_line() {
    let line = parse_line("n[int](1,10)$");
    assert_eq!(line.variable_name.unwrap().text, "n");
    assert_eq!(line.declared_type.unwrap().text, "int");
    assert_eq!(line.constraint.unwrap().text, "1,10");
    assert!(line.assertion.is_none());
    assert_eq!(line.suffix, "\n");
    assert_eq!(line.extra_brackets, 0);
}

#[test]
fn fragment_spans_point_into_the_line() {
    let text = "n[int](1,10)$";
    let line = parse_line(text);
    let declared = line.declared_type.unwrap();
    assert_eq!(declared.span, 2..5);
    assert_eq!(&text[declared.span], "int");
    let constraint = line.constraint.unwrap();
    assert_eq!(&text[constraint.span], "1,10");
}

#[test]
fn line_without_brackets_has_no_type() {
    let line = parse_line("just some notes");
    assert!(line.declared_type.is_none());
    assert!(line.variable_name.is_none());
    assert_eq!(line.suffix, " ");
}

#[test]
fn empty_brackets_have_no_type() {
    assert!(parse_line("x[](1,2)").declared_type.is_none());
}

#[test]
fn anonymous_declaration_has_no_name() {
    let line = parse_line("[int](1,2)");
    assert!(line.variable_name.is_none());
    assert_eq!(line.declared_type.unwrap().text, "int");
}

#[test]
fn name_is_the_word_before_the_bracket() {
    let line = parse_line("  count [int](1,2)");
    assert_eq!(line.variable_name.unwrap().text, "count");
    let line = parse_line("first second[int](1,2)");
    assert_eq!(line.variable_name.unwrap().text, "second");
}

#[test]
fn type_bracket_may_contain_nested_brackets() {
    let line = parse_line("m[intlist len([1,2])](0,9)");
    assert_eq!(line.declared_type.unwrap().text, "intlist len([1,2])");
    assert_eq!(line.constraint.unwrap().text, "0,9");
}

#[test]
fn constraint_is_last_top_level_group() {
    let line = parse_line("a[intlist n](0, max(n, 5))");
    assert_eq!(line.constraint.unwrap().text, "0, max(n, 5)");

    let line = parse_line("s[str (1,5)](a-z)");
    assert_eq!(line.declared_type.unwrap().text, "str (1,5)");
    assert_eq!(line.constraint.unwrap().text, "a-z");
}

#[test]
fn empty_constraint_group_is_kept() {
    let line = parse_line("s[str 3]()");
    assert_eq!(line.constraint.unwrap().text, "");
}

// =========================================================================
// Assertions
// =========================================================================

#[test]
fn single_assertion() {
    let line = parse_line("xs[intlist 3]@i * 2@");
    match line.assertion.unwrap() {
        Assertion::Single(fragment) => assert_eq!(fragment.text, "i * 2"),
        other => panic!("expected single assertion, got {other:?}"),
    }
}

#[test]
fn double_assertion() {
    let line = parse_line("xs[intlist 2]@@[1, 2]@@$");
    match line.assertion.unwrap() {
        Assertion::Double(fragment) => assert_eq!(fragment.text, "[1, 2]"),
        other => panic!("expected double assertion, got {other:?}"),
    }
    assert_eq!(line.suffix, "\n");
    assert_eq!(line.extra_brackets, 0);
}

#[test]
fn assertion_and_constraint_are_both_extracted() {
    let line = parse_line("v[int](1,5)@7@");
    assert_eq!(line.assertion.unwrap().fragment().text, "7");
    assert_eq!(line.constraint.unwrap().text, "1,5");
}

#[test]
fn dollar_inside_assertion_is_not_a_suffix() {
    let line = parse_line("t[str]@'$' * 3@");
    assert_eq!(line.assertion.unwrap().fragment().text, "'$' * 3");
    assert_eq!(line.suffix, " ");
}

#[test]
fn single_at_sign_is_not_an_assertion() {
    assert!(parse_line("x[int](1,2) @").assertion.is_none());
}

// =========================================================================
// Suffixes and warnings
// =========================================================================

#[test]
fn suffix_rules() {
    assert_eq!(parse_line("x[int](1,2)").suffix, " ");
    assert_eq!(parse_line("x[int](1,2)$").suffix, "\n");
    assert_eq!(parse_line("x[int](1,2)$\\t").suffix, "\t");
    assert_eq!(parse_line("x[int](1,2)$, ").suffix, ", ");
    assert_eq!(parse_line("x[int](1,2)$\\n\\n").suffix, "\n\n");
}

#[test]
fn dollar_in_type_is_not_a_suffix() {
    let line = parse_line("xs[intlist$ 3](0,9)");
    assert_eq!(line.suffix, " ");
}

#[test]
fn extra_brackets_are_counted() {
    let line = parse_line("x[int](1,2) [note]");
    assert_eq!(line.extra_brackets, 1);
    assert_eq!(line.constraint.unwrap().text, "1,2");
}

#[test]
fn brackets_inside_assertions_are_not_extra() {
    let line = parse_line("x[intlist 3]@a[i]@");
    assert_eq!(line.extra_brackets, 0);
    assert_eq!(line.assertion.unwrap().fragment().text, "a[i]");
}

// =========================================================================
// Type declarations
// =========================================================================

#[test]
fn parse_scalar_types() {
    assert_eq!(TypeSpec::parse("int"), Some(TypeSpec::Int));
    assert_eq!(TypeSpec::parse(" int "), Some(TypeSpec::Int));
    assert_eq!(TypeSpec::parse("str"), Some(TypeSpec::Str { size: None }));
    assert_eq!(
        TypeSpec::parse("str 5"),
        Some(TypeSpec::Str {
            size: Some(SizeExpr::Exact("5".to_string())),
        })
    );
}

#[test]
fn parse_list_types() {
    assert_eq!(
        TypeSpec::parse("intlist n"),
        Some(TypeSpec::IntList {
            size: SizeExpr::Exact("n".to_string()),
            newline: false,
        })
    );
    assert_eq!(
        TypeSpec::parse("intlist$ (1, 5)"),
        Some(TypeSpec::IntList {
            size: SizeExpr::Range("1, 5".to_string()),
            newline: true,
        })
    );
    assert_eq!(
        TypeSpec::parse("intmatrix 2, 3"),
        Some(TypeSpec::IntMatrix {
            dims: "2, 3".to_string(),
        })
    );
    assert_eq!(
        TypeSpec::parse("strlist 3,(1,5)"),
        Some(TypeSpec::StrList {
            list_len: SizeExpr::Exact("3".to_string()),
            str_len: Some(SizeExpr::Range("1,5".to_string())),
            newline: false,
        })
    );
}

#[test]
fn keyword_must_end_at_word_boundary() {
    assert_eq!(TypeSpec::parse("string"), None);
    assert_eq!(TypeSpec::parse("integer"), None);
    assert_eq!(TypeSpec::parse("float"), None);
}

#[test]
fn most_specific_keyword_wins() {
    assert_eq!(TypeSpec::parse("strlist 2,2").unwrap().keyword(), "strlist");
    assert_eq!(TypeSpec::parse("intmatrix 1,1").unwrap().keyword(), "intmatrix");
}

#[test]
fn size_range_requires_whole_group() {
    assert_eq!(SizeExpr::parse("(n-1)*2"), SizeExpr::Exact("(n-1)*2".to_string()));
    assert_eq!(SizeExpr::parse("(n)"), SizeExpr::Exact("(n)".to_string()));
    assert_eq!(
        SizeExpr::parse("(1, max(a, b))"),
        SizeExpr::Range("1, max(a, b)".to_string())
    );
}

#[test]
fn type_spec_displays_declaration() {
    let spec = TypeSpec::parse("strlist$ 3,(1,5)").unwrap();
    assert_eq!(spec.to_string(), "strlist$ 3,(1,5)");
}

// =========================================================================
// Sections and splitting
// =========================================================================

#[test]
fn active_lines_between_markers() {
    let source = "title\n#begin\na[int](1,1)\n\nb[int](2,2)\n#end\nc[int](3,3)";
    let lines = active_lines(source).unwrap();
    let numbers: Vec<usize> = lines.iter().map(|line| line.number).collect();
    assert_eq!(numbers, vec![3, 4, 5]);
    assert_eq!(lines[2].text, "b[int](2,2)");
}

#[test]
fn markers_tolerate_trailing_whitespace_and_crlf() {
    let lines = active_lines("#begin  \r\nx[int](1,1)\r\n#end\t\r\n").unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "x[int](1,1)");
}

#[test]
fn missing_end_runs_to_end_of_input() {
    let lines = active_lines("#begin\na[int](1,1)\nb[int](1,1)").unwrap();
    assert_eq!(lines.len(), 2);
}

#[test]
fn missing_begin_is_none() {
    assert!(active_lines("a[int](1,1)\n#end").is_none());
    assert!(active_lines("").is_none());
}

#[test]
fn split_respects_strings() {
    assert_eq!(split_top_level("'a,b', c", ',', None), vec!["'a,b'", " c"]);
}
