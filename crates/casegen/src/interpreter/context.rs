//! Evaluation context carrying state through expression evaluation.

use std::mem;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::interpreter::error::{EvalError, WarningKind};
use crate::interpreter::scope::Scope;
use crate::types::Value;

/// Evaluation context for one template line.
///
/// The context tracks:
/// - The run's scope, read-only while the line is evaluated
/// - Extra bindings such as the element indices `i` and `j`, and
///   comprehension variables; these shadow scope variables
/// - The run's random source, shared with the `randint`/`choice` builtins
/// - Warnings raised while generating the line
pub struct EvalContext<'a> {
    scope: &'a Scope,
    /// Innermost binding last.
    bindings: Vec<(String, Value)>,
    rng: &'a mut StdRng,
    warnings: Vec<WarningKind>,
}

impl<'a> EvalContext<'a> {
    /// Create a context over a scope and a random source.
    pub fn new(scope: &'a Scope, rng: &'a mut StdRng) -> Self {
        Self {
            scope,
            bindings: Vec::new(),
            rng,
            warnings: Vec::new(),
        }
    }

    /// Set an extra binding, replacing any previous binding of that name.
    pub fn bind(&mut self, name: &str, value: Value) {
        match self.bindings.iter_mut().rev().find(|(bound, _)| bound == name) {
            Some((_, slot)) => *slot = value,
            None => self.bindings.push((name.to_string(), value)),
        }
    }

    /// Push a shadowing binding; undone by [`EvalContext::pop_binding`].
    pub(crate) fn push_binding(&mut self, name: &str, value: Value) {
        self.bindings.push((name.to_string(), value));
    }

    pub(crate) fn set_innermost(&mut self, value: Value) {
        if let Some((_, slot)) = self.bindings.last_mut() {
            *slot = value;
        }
    }

    pub(crate) fn pop_binding(&mut self) {
        self.bindings.pop();
    }

    /// Resolve a name: extra bindings first, then the scope.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
            .or_else(|| self.scope.lookup(name))
    }

    /// Every name currently visible, for suggestions.
    pub fn visible_names(&self) -> Vec<String> {
        self.bindings
            .iter()
            .map(|(name, _)| name.clone())
            .chain(self.scope.names().map(ToString::to_string))
            .collect()
    }

    /// Uniform random integer in `[low, high]`.
    pub fn randint(&mut self, low: i64, high: i64) -> Result<i64, EvalError> {
        if low > high {
            return Err(EvalError::EmptyRange { low, high });
        }
        Ok(self.rng.gen_range(low..=high))
    }

    /// Uniformly pick one element.
    pub fn choose<'v, T>(&mut self, items: &'v [T]) -> Option<&'v T> {
        items.choose(&mut *self.rng)
    }

    /// Record a warning for the current line.
    pub fn add_warning(&mut self, warning: WarningKind) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Drain all collected warnings.
    pub fn take_warnings(&mut self) -> Vec<WarningKind> {
        mem::take(&mut self.warnings)
    }
}
