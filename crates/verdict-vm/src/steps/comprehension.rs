//! The comprehension loop protocol.
//!
//! A comprehension (`map`/`filter`/`exists`/`all`, generic fold) occupies a
//! fixed five-slot stack region, bottom to top:
//!
//! 0. current accumulator value, readable through `accu_var`
//! 1. iteration range (must be a list)
//! 2. current integer index into the range
//! 3. current element, readable through `iter_var`
//! 4. just-computed loop step or initial accumulator
//!
//! Three cooperating steps manipulate the region. The fixed shape lets the
//! compiler emit a constant-size instruction layout for every comprehension
//! regardless of its body, with all jump offsets computed by arithmetic.

use crate::error::{Result, VmError};
use crate::frame::ExecutionFrame;
use crate::value::Value;

const POS_ITER_RANGE: usize = 1;
const POS_CURRENT_INDEX: usize = 2;
const POS_LOOP_STEP: usize = 4;

/// Entry point of each iteration.
///
/// Stack before: 5 (see module docs).
/// Stack after: 4 — new accumulator, range, advanced index, next element.
/// Stack on loop exit: 1 — the accumulator alone.
/// Stack on error exit: 1 — an error value, after clearing the region.
///
/// A non-list range is a language-level outcome: the region is cleared, the
/// pre-existing error (or a synthesized no-matching-overload) is pushed,
/// and control transfers to the error offset. A non-integer index slot is a
/// defect. The iteration budget is charged exactly once per execution of
/// this step, including the terminating one.
#[derive(Debug, Clone)]
pub struct ComprehensionNextStep {
    accu_var: String,
    iter_var: String,
    pub(crate) jump_offset: Option<isize>,
    pub(crate) error_jump_offset: Option<isize>,
}

impl ComprehensionNextStep {
    pub fn new(accu_var: impl Into<String>, iter_var: impl Into<String>) -> Self {
        Self {
            accu_var: accu_var.into(),
            iter_var: iter_var.into(),
            jump_offset: None,
            error_jump_offset: None,
        }
    }

    pub fn with_offsets(mut self, jump_offset: isize, error_jump_offset: isize) -> Self {
        self.jump_offset = Some(jump_offset);
        self.error_jump_offset = Some(error_jump_offset);
        self
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        let state = frame.stack.get_span(5)?;
        let iter_range = state[POS_ITER_RANGE].clone();

        let items = match &iter_range {
            Value::List(items) => items.clone(),
            _ => {
                // Sole error exit of the loop body: clear the region, put
                // the error on the stack, divert to the handler.
                frame.stack.pop(5)?;
                let err = if iter_range.is_error() {
                    iter_range
                } else {
                    frame.arena.no_matching_overload()
                };
                frame.stack.push(err);
                let offset = self.error_jump_offset.ok_or(VmError::JumpOffsetUnset)?;
                return frame.jump_to(offset);
            }
        };

        let current_index = match &state[POS_CURRENT_INDEX] {
            Value::Int(i) => *i,
            other => {
                return Err(VmError::TypeMismatch {
                    context: "comprehension cursor",
                    want: "int",
                    got: other.type_name(),
                })
            }
        };
        let loop_step = state[POS_LOOP_STEP].clone();

        frame.increment_iterations()?;

        frame.stack.pop(5)?;
        frame.stack.push(loop_step.clone());
        frame.bindings.bind(self.accu_var.clone(), loop_step);

        // The element just consumed was the last (or the range is empty):
        // erase the element binding and leave only the accumulator.
        if current_index >= items.len() as i64 - 1 {
            frame.bindings.erase(&self.iter_var);
            let offset = self.jump_offset.ok_or(VmError::JumpOffsetUnset)?;
            return frame.jump_to(offset);
        }

        let current_index = current_index + 1;
        let current_value = items[current_index as usize].clone();
        frame.stack.push(Value::List(items));
        frame.stack.push(Value::Int(current_index));
        frame.stack.push(current_value.clone());
        frame.bindings.bind(self.iter_var.clone(), current_value);
        Ok(())
    }
}

/// Loop-guard evaluation.
///
/// Stack before: 5, with a Bool on top (anything else is a defect).
/// Stack after: 4 — the guard is popped.
/// Stack on break: 1 — element, index, and range discarded, `iter_var`
/// erased, control transferred past the remaining iterations.
#[derive(Debug, Clone)]
pub struct ComprehensionCondStep {
    iter_var: String,
    shortcircuit: bool,
    pub(crate) jump_offset: Option<isize>,
}

impl ComprehensionCondStep {
    pub fn new(iter_var: impl Into<String>, shortcircuit: bool) -> Self {
        Self {
            iter_var: iter_var.into(),
            shortcircuit,
            jump_offset: None,
        }
    }

    pub fn with_offset(mut self, jump_offset: isize) -> Self {
        self.jump_offset = Some(jump_offset);
        self
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        if !frame.stack.has_enough(5) {
            return Err(VmError::StackUnderflow);
        }
        let top = frame.stack.peek()?;
        let condition = match top {
            Value::Bool(b) => *b,
            other => {
                return Err(VmError::TypeMismatch {
                    context: "comprehension guard",
                    want: "bool",
                    got: other.type_name(),
                })
            }
        };
        frame.stack.pop(1)?;
        if !condition && self.shortcircuit {
            // current element, index, iteration range
            frame.stack.pop(3)?;
            frame.bindings.erase(&self.iter_var);
            let offset = self.jump_offset.ok_or(VmError::JumpOffsetUnset)?;
            return frame.jump_to(offset);
        }
        Ok(())
    }
}

/// Terminal step of the loop.
///
/// Stack before: 2 — the accumulator beneath the computed result.
/// Stack after: 1 — the result alone; `accu_var` is erased so it cannot
/// leak past the comprehension's scope.
#[derive(Debug, Clone)]
pub struct ComprehensionFinishStep {
    accu_var: String,
}

impl ComprehensionFinishStep {
    pub fn new(accu_var: impl Into<String>) -> Self {
        Self {
            accu_var: accu_var.into(),
        }
    }

    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        if !frame.stack.has_enough(2) {
            return Err(VmError::StackUnderflow);
        }
        let result = frame.stack.peek()?.clone();
        frame.stack.pop(1)?;
        frame.stack.pop_and_push(result)?;
        frame.bindings.erase(&self.accu_var);
        Ok(())
    }
}

/// Replaces a map on top of the stack with the list of its keys.
///
/// Deliberately permissive: any other value is left untouched, because the
/// surrounding compiled program already guarantees the operand's type when
/// it emits this step.
#[derive(Debug, Clone)]
pub struct ListKeysStep;

impl ListKeysStep {
    pub fn evaluate(&self, frame: &mut ExecutionFrame) -> Result<()> {
        let top = frame.stack.peek()?;
        if let Value::Map(map) = top {
            let keys = map.keys_list();
            frame.stack.pop_and_push(keys)?;
        }
        Ok(())
    }
}
