use std::collections::HashMap;

use crate::value::Value;

/// Name to value bindings that identifiers are resolved against.
///
/// Evaluation only ever calls [`Environment::lookup`]; binding is left to the owner.
pub trait Environment {
    /// Returns a copy of the bound value, never a reference into the environment.
    fn lookup(&self, name: &str) -> Option<Value>;

    fn bind(&mut self, name: &str, value: Value);
}

impl Environment for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn bind(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

/// A single flat global scope.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Globals {
    values: HashMap<String, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Environment for Globals {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.values.lookup(name)
    }

    fn bind(&mut self, name: &str, value: Value) {
        log::debug!("bind {name} = {value}");
        self.values.bind(name, value)
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Globals {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect() }
    }
}
