//! Identifier resolution.

use crate::error::{EvalError, Result};
use crate::frame::ExecutionFrame;

/// Pushes the value bound to a name.
///
/// Resolves against the frame's bindings (activation entries plus any live
/// comprehension variables). A missing name is a language-level outcome,
/// not a defect: an `UndeclaredReference` error value is pushed so the
/// surrounding program can short-circuit on it.
#[derive(Debug, Clone)]
pub struct IdentStep {
    name: String,
}

impl IdentStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        let value = match frame.bindings.get(&self.name) {
            Some(v) => v.clone(),
            None => frame
                .arena
                .error(EvalError::UndeclaredReference(self.name.clone())),
        };
        frame.stack.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::Bindings;
    use crate::frame::EvalConfig;
    use crate::value::Value;

    #[test]
    fn test_resolves_bound_name() {
        let mut bindings = Bindings::new();
        bindings.bind("limit", Value::Int(10));
        let mut frame = ExecutionFrame::new(1, bindings, &EvalConfig::default());
        IdentStep::new("limit").evaluate(&mut frame).unwrap();
        assert_eq!(frame.value_stack().peek().unwrap(), &Value::Int(10));
    }

    #[test]
    fn test_missing_name_is_error_value() {
        let mut frame = ExecutionFrame::new(1, Bindings::new(), &EvalConfig::default());
        IdentStep::new("ghost").evaluate(&mut frame).unwrap();
        assert_eq!(
            frame.value_stack().peek().unwrap().as_error(),
            Some(&EvalError::UndeclaredReference("ghost".to_string()))
        );
    }
}
