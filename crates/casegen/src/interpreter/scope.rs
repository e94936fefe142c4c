//! Run-lifetime variable storage.

use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

use serde::Serialize;

use crate::types::Value;

/// Mapping from declared variable names to their last assigned value.
///
/// A scope lives for exactly one generation run. Each line that declares a
/// name assigns the final, validated value; later lines read it through
/// expressions.
///
/// # Example
///
/// ```
/// use casegen::{Scope, Value};
///
/// let mut scope = Scope::new();
/// scope.assign("n", Value::Int(3));
/// scope.assign("n", Value::Int(4));
/// assert_eq!(scope.lookup("n"), Some(&Value::Int(4)));
/// assert_eq!(scope.lookup("m"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Scope {
    bindings: BTreeMap<String, Value>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a binding.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a binding.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Iterate over bindings in name order.
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.bindings.iter()
    }

    /// All bound names, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a Scope {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}
