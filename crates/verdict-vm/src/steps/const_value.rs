//! Literal push.

use crate::error::Result;
use crate::frame::ExecutionFrame;
use crate::value::Value;

/// Pushes one precomputed value.
///
/// The value is converted once, at program construction, from a literal
/// (null/bool/int/uint/double/string/bytes/duration/timestamp or an enum's
/// numeric value). No side effects beyond the push; never fails.
#[derive(Debug, Clone)]
pub struct ConstStep {
    value: Value,
}

impl ConstStep {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        frame.stack.push(self.value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::Bindings;
    use crate::frame::EvalConfig;

    #[test]
    fn test_pushes_value() {
        let mut frame = ExecutionFrame::new(1, Bindings::new(), &EvalConfig::default());
        let step = ConstStep::new(Value::Int(42));
        step.evaluate(&mut frame).unwrap();
        step.evaluate(&mut frame).unwrap();
        assert_eq!(frame.value_stack().len(), 2);
        assert_eq!(frame.value_stack().peek().unwrap(), &Value::Int(42));
    }

    #[test]
    fn test_temporal_literals() {
        use chrono::{Duration, TimeZone, Utc};

        let mut frame = ExecutionFrame::new(2, Bindings::new(), &EvalConfig::default());
        ConstStep::new(Value::Duration(Duration::seconds(30)))
            .evaluate(&mut frame)
            .unwrap();
        let epoch = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        ConstStep::new(Value::Timestamp(epoch))
            .evaluate(&mut frame)
            .unwrap();
        assert_eq!(frame.value_stack().peek().unwrap(), &Value::Timestamp(epoch));
    }
}
