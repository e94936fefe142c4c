//! Parsing of the declared type inside a line's `[...]` bracket.

use std::fmt::{Display, Formatter, Result as FmtResult};

use super::expr::is_ident_cont;
use super::scan::{last_paren_group, split_top_level};

/// Type keywords in dispatch order: most specific first.
pub const TYPE_KEYWORDS: [&str; 5] = ["intmatrix", "intlist", "strlist", "str", "int"];

/// A recognised type declaration with its raw size expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// `int`
    Int,
    /// `intlist n`, `intlist (lo,hi)`; `$` anywhere in the bracket joins with newlines.
    IntList { size: SizeExpr, newline: bool },
    /// `intmatrix r,c`
    IntMatrix { dims: String },
    /// `str n`, `str (lo,hi)`, or bare `str` when an assertion supplies the value.
    Str { size: Option<SizeExpr> },
    /// `strlist listLen,strLen`; `$` joins with newlines.
    StrList {
        list_len: SizeExpr,
        str_len: Option<SizeExpr>,
        newline: bool,
    },
}

/// How a length is given: a single expression or a `(lo,hi)` range to sample from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeExpr {
    /// An expression evaluating to the exact size.
    Exact(String),
    /// The inside of a `(lo,hi)` group; split and evaluated at generation time.
    Range(String),
}

impl SizeExpr {
    /// Classify size text. It is a range only when the whole text is one
    /// parenthesised group with a top-level comma, so `(n-1)*2` stays exact.
    ///
    /// ```
    /// use casegen::parser::SizeExpr;
    ///
    /// assert_eq!(SizeExpr::parse(" (1, 5) "), SizeExpr::Range("1, 5".into()));
    /// assert_eq!(SizeExpr::parse("(n-1)*2"), SizeExpr::Exact("(n-1)*2".into()));
    /// ```
    pub fn parse(text: &str) -> SizeExpr {
        let trimmed = text.trim();
        let whole_group = last_paren_group(trimmed)
            .is_some_and(|group| group.start == 0 && group.end == trimmed.len());
        if whole_group {
            let inner = &trimmed[1..trimmed.len() - 1];
            if split_top_level(inner, ',', None).len() > 1 {
                return SizeExpr::Range(inner.to_string());
            }
        }
        SizeExpr::Exact(trimmed.to_string())
    }
}

impl TypeSpec {
    /// Recognise the content of a type bracket.
    ///
    /// Returns `None` when no keyword matches; such lines are skipped.
    /// A keyword must be followed by a non-word character, so `string`
    /// is not `str`.
    pub fn parse(declared: &str) -> Option<TypeSpec> {
        let declared = declared.trim();
        let (keyword, rest) = TYPE_KEYWORDS.iter().find_map(|keyword| {
            let rest = declared.strip_prefix(keyword)?;
            (!rest.starts_with(is_ident_cont)).then_some((*keyword, rest))
        })?;

        let newline = rest.contains('$');
        let rest = rest.replace('$', "");
        let rest = rest.trim();

        let spec = match keyword {
            "int" => TypeSpec::Int,
            "intlist" => TypeSpec::IntList {
                size: SizeExpr::parse(rest),
                newline,
            },
            "intmatrix" => TypeSpec::IntMatrix {
                dims: rest.to_string(),
            },
            "str" => TypeSpec::Str {
                size: (!rest.is_empty()).then(|| SizeExpr::parse(rest)),
            },
            _ => {
                let mut parts = split_top_level(rest, ',', Some(1)).into_iter();
                let list_len = SizeExpr::parse(parts.next().unwrap_or_default());
                let str_len = parts.next().map(SizeExpr::parse);
                TypeSpec::StrList {
                    list_len,
                    str_len,
                    newline,
                }
            }
        };
        Some(spec)
    }

    /// The keyword this declaration was written with.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeSpec::Int => "int",
            TypeSpec::IntList { .. } => "intlist",
            TypeSpec::IntMatrix { .. } => "intmatrix",
            TypeSpec::Str { .. } => "str",
            TypeSpec::StrList { .. } => "strlist",
        }
    }
}

impl Display for SizeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SizeExpr::Exact(expr) => write!(f, "{expr}"),
            SizeExpr::Range(inner) => write!(f, "({inner})"),
        }
    }
}

impl Display for TypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::IntList { size, newline } => {
                write!(f, "intlist{} {size}", if *newline { "$" } else { "" })
            }
            TypeSpec::IntMatrix { dims } => write!(f, "intmatrix {dims}"),
            TypeSpec::Str { size: None } => write!(f, "str"),
            TypeSpec::Str { size: Some(size) } => write!(f, "str {size}"),
            TypeSpec::StrList {
                list_len,
                str_len,
                newline,
            } => {
                write!(f, "strlist{} {list_len}", if *newline { "$" } else { "" })?;
                if let Some(str_len) = str_len {
                    write!(f, ",{str_len}")?;
                }
                Ok(())
            }
        }
    }
}
