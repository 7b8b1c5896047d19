//! Native function dispatch.

use crate::error::Result;
use crate::frame::ExecutionFrame;
use crate::registry::FunctionRegistry;
use crate::value::Value;

/// Calls a named native function with the top `arg_count` stack entries.
///
/// Stack before: the arguments, bottom-to-top in call order.
/// Stack after: the single result value.
///
/// Errors and unknowns riding in the arguments short-circuit the call: the
/// first error argument (or the merged unknown set) becomes the result
/// without invoking the function. An unregistered name yields a
/// no-matching-overload error value. The call itself never aborts the
/// interpreter; failures are values.
#[derive(Debug, Clone)]
pub struct CallStep {
    function: String,
    arg_count: usize,
}

impl CallStep {
    pub fn new(function: impl Into<String>, arg_count: usize) -> Self {
        Self {
            function: function.into(),
            arg_count,
        }
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame, functions: &FunctionRegistry) -> Result<()> {
        let args = frame.stack.get_span(self.arg_count)?;

        if let Some(err) = args.iter().find(|v| v.is_error()) {
            let err = err.clone();
            frame.stack.pop(self.arg_count)?;
            frame.stack.push(err);
            return Ok(());
        }

        let unknowns: Vec<&Value> = args.iter().filter(|v| v.is_unknown()).collect();
        if !unknowns.is_empty() {
            let merged = unknowns
                .iter()
                .filter_map(|v| match v {
                    Value::Unknown(set) => Some(set.as_ref()),
                    _ => None,
                })
                .fold(crate::value::UnknownSet::default(), |acc, set| {
                    acc.merge(set)
                });
            frame.stack.pop(self.arg_count)?;
            frame.stack.push(Value::Unknown(std::sync::Arc::new(merged)));
            return Ok(());
        }

        let result = match functions.get(&self.function) {
            Some(f) => f(args),
            None => frame.arena.no_matching_overload(),
        };
        frame.stack.pop(self.arg_count)?;
        frame.stack.push(result);
        Ok(())
    }
}
