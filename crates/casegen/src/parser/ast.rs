//! Public AST types for template expressions.
//!
//! These types are public so tooling (the `check` command, linters) can walk
//! expressions without evaluating them.

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal: `42`
    Int(i64),
    /// String literal with escapes already resolved: `'ab'`
    Str(String),
    /// `True` / `False`
    Bool(bool),
    /// Reference to a scope variable or an extra binding such as `i`.
    Name(String),
    /// List display: `[a, b, c]`
    List(Vec<Expr>),
    /// Parenthesised tuple: `(a, b)`. Evaluates to a list.
    Tuple(Vec<Expr>),
    /// List comprehension: `[element for var in iterable if condition]`
    Comprehension {
        element: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
    /// Prefix operator: `-x`, `+x`, `not x`
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Arithmetic operator: `a + b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison chain: `a < b <= c`
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
    /// Short-circuit `and`
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit `or`
    Or(Box<Expr>, Box<Expr>),
    /// `then if condition else otherwise`
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Builtin call: `len(x)`
    Call { function: String, args: Vec<Expr> },
    /// Subscript: `x[i]`
    Index { target: Box<Expr>, index: Box<Expr> },
    /// Slice: `x[start:end]`, either bound optional.
    Slice {
        target: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// `/`, floor division on integers.
    Div,
    /// `//`
    FloorDiv,
    Mod,
    Pow,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl BinaryOp {
    /// Source symbol, for error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        }
    }
}

impl CompareOp {
    /// Source symbol, for error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::In => "in",
            CompareOp::NotIn => "not in",
        }
    }
}

impl Expr {
    /// Collect every free variable name referenced by this expression.
    ///
    /// Comprehension variables are bound inside their comprehension and are
    /// not reported. Names are returned in first-occurrence order.
    pub fn free_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut Vec::new(), &mut names);
        names
    }

    fn collect_names(&self, bound: &mut Vec<String>, out: &mut Vec<String>) {
        match self {
            Expr::Int(_) | Expr::Str(_) | Expr::Bool(_) => {}
            Expr::Name(name) => {
                if !bound.contains(name) && !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::List(items) | Expr::Tuple(items) => {
                for item in items {
                    item.collect_names(bound, out);
                }
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_names(bound, out);
                }
            }
            Expr::Comprehension {
                element,
                var,
                iterable,
                condition,
            } => {
                iterable.collect_names(bound, out);
                bound.push(var.clone());
                element.collect_names(bound, out);
                if let Some(condition) = condition {
                    condition.collect_names(bound, out);
                }
                bound.pop();
            }
            Expr::Unary { operand, .. } => operand.collect_names(bound, out),
            Expr::Binary { left, right, .. } | Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_names(bound, out);
                right.collect_names(bound, out);
            }
            Expr::Compare { first, rest } => {
                first.collect_names(bound, out);
                for (_, operand) in rest {
                    operand.collect_names(bound, out);
                }
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                then.collect_names(bound, out);
                condition.collect_names(bound, out);
                otherwise.collect_names(bound, out);
            }
            Expr::Index { target, index } => {
                target.collect_names(bound, out);
                index.collect_names(bound, out);
            }
            Expr::Slice { target, start, end } => {
                target.collect_names(bound, out);
                for bound_expr in [start, end].into_iter().flatten() {
                    bound_expr.collect_names(bound, out);
                }
            }
        }
    }
}
