use crate::value::Value;
use compact_str::{CompactString, ToCompactString};
use std::collections::HashMap;

/// The variable store of one interpreter session.
///
/// Entries are never removed. The order in which names were first assigned is kept so that
/// dumps of the store come out the same on every run.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<CompactString, Value>,
    order: Vec<CompactString>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn assign(&mut self, name: &str, value: Value) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                let name = name.to_compact_string();
                self.order.push(name.clone());
                self.values.insert(name, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over the variables in first-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|value| (name.as_str(), value)))
    }
}
