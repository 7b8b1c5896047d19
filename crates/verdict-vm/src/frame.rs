//! Per-evaluation execution state.
//!
//! An [`ExecutionFrame`] is created for every call into the interpreter and
//! owns everything mutable: the value stack, the bindings table, the
//! program counter, the iteration counter, and the allocation arena. The
//! program itself is shared and read-only, so frames never synchronize.

use serde::{Deserialize, Serialize};

use crate::arena::EvalArena;
use crate::bindings::Bindings;
use crate::error::{Result, VmError};
use crate::stack::ValueStack;

/// Resource limits for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Maximum comprehension iterations before the evaluation is aborted
    /// with [`VmError::ResourceExhausted`]. Zero disables the budget.
    pub max_iterations: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { max_iterations: 0 }
    }
}

/// Mutable state threaded through every step of one evaluation.
#[derive(Debug)]
pub struct ExecutionFrame {
    pub(crate) stack: ValueStack,
    pub(crate) bindings: Bindings,
    pub(crate) arena: EvalArena,
    pub(crate) pc: usize,
    pub(crate) jumped: bool,
    program_len: usize,
    iterations: u64,
    max_iterations: u64,
}

impl ExecutionFrame {
    pub fn new(program_len: usize, bindings: Bindings, config: &EvalConfig) -> Self {
        Self {
            stack: ValueStack::new(),
            bindings,
            arena: EvalArena::new(),
            pc: 0,
            jumped: false,
            program_len,
            iterations: 0,
            max_iterations: config.max_iterations,
        }
    }

    pub fn value_stack(&self) -> &ValueStack {
        &self.stack
    }

    pub fn iter_vars(&self) -> &Bindings {
        &self.bindings
    }

    pub fn arena(&self) -> &EvalArena {
        &self.arena
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Reposition the program counter relative to the current step and
    /// signal the driver not to advance. A target equal to the program
    /// length terminates normally; anything outside `0..=len` is a defect.
    pub fn jump_to(&mut self, offset: isize) -> Result<()> {
        let target = self.pc as i64 + offset as i64;
        if target < 0 || target > self.program_len as i64 {
            return Err(VmError::JumpOutOfRange(target));
        }
        self.pc = target as usize;
        self.jumped = true;
        Ok(())
    }

    /// Charge one comprehension iteration against the budget.
    ///
    /// Called exactly once per `ComprehensionNext` execution — not once per
    /// step — so the count matches loop iterations. This is the sole
    /// defense against unbounded or adversarial loop bodies.
    pub fn increment_iterations(&mut self) -> Result<()> {
        if self.max_iterations == 0 {
            return Ok(());
        }
        self.iterations += 1;
        if self.iterations > self.max_iterations {
            return Err(VmError::ResourceExhausted(self.max_iterations));
        }
        Ok(())
    }
}
