//! Native function registry.
//!
//! Call steps dispatch by name through this table. Registration is
//! runtime-dynamic because programs resolve their functions per embedding;
//! overload selection happens in the compiler, so a name either has one
//! implementation here or the call site surfaces a no-matching-overload
//! error value.

use indexmap::IndexMap;

use crate::value::Value;

/// A host-native function callable from compiled programs.
///
/// Receives the arguments bottom-to-top in call order; failures are
/// returned as [`Value::Error`], never panics.
pub type NativeFunction = Box<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Name → implementation table.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, NativeFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation, replacing any previous one of the same
    /// name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        function: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
