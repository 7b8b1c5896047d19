//! The driver loop.
//!
//! Executes the step at the current program counter, advances by one on a
//! normal return, honors jump signals, and stops when the counter runs past
//! the end of the program, at which point exactly one value must remain on
//! the stack. Evaluation is single-threaded and non-suspending; parallelism
//! happens across evaluations, each with its own frame.

use tracing::{debug, error, trace};

use crate::bindings::Bindings;
use crate::error::{Result, VmError};
use crate::frame::{EvalConfig, ExecutionFrame};
use crate::program::{Program, Step};
use crate::registry::FunctionRegistry;
use crate::value::Value;

/// Drives one program against per-call execution frames.
///
/// Holds only shared, read-only state, so a single interpreter serves any
/// number of concurrent evaluations.
#[derive(Debug)]
pub struct Interpreter<'a> {
    program: &'a Program,
    functions: &'a FunctionRegistry,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program, functions: &'a FunctionRegistry) -> Self {
        Self { program, functions }
    }

    /// Run the program to completion against fresh state.
    ///
    /// Evaluation errors surface as an `Ok` result carrying
    /// [`Value::Error`]; an `Err` means the program is malformed or the
    /// iteration budget ran out.
    pub fn evaluate(&self, activation: &Bindings, config: &EvalConfig) -> Result<Value> {
        let mut frame = ExecutionFrame::new(self.program.len(), activation.clone(), config);
        debug!(steps = self.program.len(), "evaluation start");

        while let Some(step) = self.program.step(frame.pc) {
            if let Err(err) = self.dispatch(step, &mut frame) {
                error!(pc = frame.pc, %err, "evaluation aborted");
                return Err(err);
            }
            if frame.jumped {
                frame.jumped = false;
                trace!(pc = frame.pc, "jump");
            } else {
                frame.pc += 1;
            }
        }

        if frame.value_stack().len() != 1 {
            return Err(VmError::UnbalancedStack(frame.value_stack().len()));
        }
        let result = frame.value_stack().peek()?.clone();
        debug!(
            iterations = frame.iterations(),
            result = result.type_name(),
            "evaluation complete"
        );
        Ok(result)
    }

    fn dispatch(&self, step: &Step, frame: &mut ExecutionFrame) -> Result<()> {
        match step {
            Step::Const(s) => s.evaluate(frame),
            Step::Ident(s) => s.evaluate(frame),
            Step::Call(s) => s.evaluate(frame, self.functions),
            Step::Jump(s) => s.evaluate(frame),
            Step::CondJump(s) => s.evaluate(frame),
            Step::ErrorJump(s) => s.evaluate(frame),
            Step::ComprehensionNext(s) => s.evaluate(frame),
            Step::ComprehensionCond(s) => s.evaluate(frame),
            Step::ComprehensionFinish(s) => s.evaluate(frame),
            Step::ListKeys(s) => s.evaluate(frame),
        }
    }
}

/// Evaluate a program that calls no native functions.
///
/// Convenience wrapper over [`Interpreter`] for the common
/// `evaluate(program, initial bindings, budget)` entry point.
pub fn evaluate(program: &Program, activation: &Bindings, config: &EvalConfig) -> Result<Value> {
    let functions = FunctionRegistry::new();
    Interpreter::new(program, &functions).evaluate(activation, config)
}
