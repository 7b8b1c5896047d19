//! Control-transfer steps.
//!
//! Offsets are relative instruction-index deltas, resolved by the compiler
//! before execution. A jump whose offset was never assigned is a defect in
//! the compiled program.

use crate::error::{Result, VmError};
use crate::frame::ExecutionFrame;
use crate::value::Value;

/// Unconditional transfer to `pc + offset`.
#[derive(Debug, Clone)]
pub struct JumpStep {
    pub(crate) offset: Option<isize>,
}

impl JumpStep {
    pub fn new(offset: Option<isize>) -> Self {
        Self { offset }
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        let offset = self.offset.ok_or(VmError::JumpOffsetUnset)?;
        frame.jump_to(offset)
    }
}

/// Transfer when the boolean on top of the stack matches `jump_condition`.
///
/// Stack before: 1 (a Bool; anything else is a defect).
/// Stack after: unchanged when `leave_on_stack`, else one entry shorter —
/// the boolean is popped before the jump decision, whether or not the jump
/// is taken. Short-circuit boolean operators pop (the result *is* the
/// boolean); guard-style tests keep it for a later step.
#[derive(Debug, Clone)]
pub struct CondJumpStep {
    jump_condition: bool,
    leave_on_stack: bool,
    pub(crate) offset: Option<isize>,
}

impl CondJumpStep {
    pub fn new(jump_condition: bool, leave_on_stack: bool, offset: Option<isize>) -> Self {
        Self {
            jump_condition,
            leave_on_stack,
            offset,
        }
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        let top = frame.stack.peek()?;
        let condition = match top {
            Value::Bool(b) => *b,
            other => {
                return Err(VmError::TypeMismatch {
                    context: "conditional jump",
                    want: "bool",
                    got: other.type_name(),
                })
            }
        };
        if !self.leave_on_stack {
            frame.stack.pop(1)?;
        }
        if condition == self.jump_condition {
            let offset = self.offset.ok_or(VmError::JumpOffsetUnset)?;
            frame.jump_to(offset)?;
        }
        Ok(())
    }
}

/// Transfer when the top of the stack is an error (or, when configured, a
/// settled boolean), leaving the inspected value in place for the target
/// to consume.
///
/// An error value riding on the stack is itself the control signal: this is
/// how short-circuit propagation of errors and unknowns works without a
/// separate exception channel. Unknowns divert like errors.
#[derive(Debug, Clone)]
pub struct ErrorJumpStep {
    jump_on_bool: bool,
    pub(crate) offset: Option<isize>,
}

impl ErrorJumpStep {
    pub fn new(jump_on_bool: bool, offset: Option<isize>) -> Self {
        Self {
            jump_on_bool,
            offset,
        }
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        let top = frame.stack.peek()?;
        let divert = top.is_error()
            || top.is_unknown()
            || (self.jump_on_bool && matches!(top, Value::Bool(_)));
        if divert {
            let offset = self.offset.ok_or(VmError::JumpOffsetUnset)?;
            frame.jump_to(offset)?;
        }
        Ok(())
    }
}
