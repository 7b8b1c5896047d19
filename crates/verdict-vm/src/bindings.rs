//! Variable bindings.
//!
//! One table resolves every identifier during an evaluation: the caller's
//! activation entries plus the comprehension-scoped `accu_var`/`iter_var`
//! entries, which are bound when a loop produces them, overwritten each
//! iteration, and erased on every exit path so they never leak into an
//! enclosing scope or a sibling loop reusing the same name.

use indexmap::IndexMap;

use crate::value::Value;

/// Name → value table with unique keys.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: IndexMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    /// Remove a binding, returning its value if present.
    pub fn erase(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_overwrites() {
        let mut bindings = Bindings::new();
        bindings.bind("x", Value::Int(1));
        bindings.bind("x", Value::Int(2));
        assert_eq!(bindings.get("x"), Some(&Value::Int(2)));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_erase_removes() {
        let mut bindings = Bindings::new();
        bindings.bind("x", Value::Int(1));
        assert_eq!(bindings.erase("x"), Some(Value::Int(1)));
        assert!(!bindings.contains("x"));
        assert_eq!(bindings.erase("x"), None);
    }
}
