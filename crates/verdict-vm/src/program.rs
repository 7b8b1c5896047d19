//! Compiled programs.
//!
//! A [`Program`] is an immutable, ordered step sequence with jump offsets
//! already resolved to relative instruction-index deltas. It is produced
//! once and shared read-only across any number of concurrent evaluations.
//!
//! [`ProgramBuilder`] is the assembly surface for the external compiler and
//! for tests. [`Comprehension`] lays out the fixed instruction shape every
//! loop compiles to; with single-step subexpressions it is, index by index:
//!
//! ```text
//!  0  placeholder (previous loop step)     stack 1
//!  1  iter_range                           stack 2
//!  2  -1                                   stack 3
//!  3  placeholder (current element)        stack 4
//!  4  accu_init                            stack 5
//!  5  ComprehensionNext                    stack 4
//!  6  loop_condition                       stack 5
//!  7  ComprehensionCond                    stack 4
//!  8  loop_step                            stack 5
//!  9  jump back to 5                       stack 5
//! 10  result                               stack 2
//! 11  ComprehensionFinish                  stack 1
//! ```
//!
//! Both break paths (loop exhausted, guard short-circuit) land on the
//! result expression; the error exit lands one past the finish step. All
//! four offsets fall out of the layout arithmetic, which is validated in
//! debug builds.

use crate::error::{Result, VmError};
use crate::steps::{
    CallStep, ComprehensionCondStep, ComprehensionFinishStep, ComprehensionNextStep, CondJumpStep,
    ConstStep, ErrorJumpStep, IdentStep, JumpStep, ListKeysStep,
};
use crate::value::Value;

/// One instruction of a compiled program.
///
/// A closed set, matched exhaustively by the driver; each variant carries
/// its own stack contract.
#[derive(Debug, Clone)]
pub enum Step {
    Const(ConstStep),
    Ident(IdentStep),
    Call(CallStep),
    Jump(JumpStep),
    CondJump(CondJumpStep),
    ErrorJump(ErrorJumpStep),
    ComprehensionNext(ComprehensionNextStep),
    ComprehensionCond(ComprehensionCondStep),
    ComprehensionFinish(ComprehensionFinishStep),
    ListKeys(ListKeysStep),
}

/// Immutable step sequence, safe to share across threads.
#[derive(Debug)]
pub struct Program {
    steps: Vec<Step>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

/// Incremental program assembly.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    steps: Vec<Step>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step, returning its index.
    pub fn emit(&mut self, step: Step) -> usize {
        self.steps.push(step);
        self.steps.len() - 1
    }

    /// Append a sequence of steps.
    pub fn extend(&mut self, steps: Vec<Step>) {
        self.steps.extend(steps);
    }

    /// Index the next emitted step will occupy.
    pub fn next_index(&self) -> usize {
        self.steps.len()
    }

    /// Lay out a full comprehension at the current position.
    pub fn emit_comprehension(&mut self, comprehension: Comprehension) {
        self.extend(comprehension.into_steps());
    }

    /// Finalize, validating that every assigned jump offset lands inside
    /// `0..=len`. Unassigned offsets pass — executing one is a runtime
    /// defect.
    pub fn build(self) -> Result<Program> {
        let len = self.steps.len() as i64;
        for (index, step) in self.steps.iter().enumerate() {
            for offset in assigned_offsets(step).into_iter().flatten() {
                let target = index as i64 + offset as i64;
                if target < 0 || target > len {
                    return Err(VmError::JumpOutOfRange(target));
                }
            }
        }
        Ok(Program { steps: self.steps })
    }
}

fn assigned_offsets(step: &Step) -> [Option<isize>; 2] {
    match step {
        Step::Jump(s) => [s.offset, None],
        Step::CondJump(s) => [s.offset, None],
        Step::ErrorJump(s) => [s.offset, None],
        Step::ComprehensionNext(s) => [s.jump_offset, s.error_jump_offset],
        Step::ComprehensionCond(s) => [s.jump_offset, None],
        _ => [None, None],
    }
}

/// The parts of one comprehension, each an already-compiled step sequence
/// that leaves exactly one value on the stack.
#[derive(Debug, Clone)]
pub struct Comprehension {
    pub accu_var: String,
    pub iter_var: String,
    pub shortcircuit: bool,
    pub iter_range: Vec<Step>,
    pub accu_init: Vec<Step>,
    pub loop_condition: Vec<Step>,
    pub loop_step: Vec<Step>,
    pub result: Vec<Step>,
}

impl Comprehension {
    /// Assemble the fixed loop layout with all offsets computed.
    ///
    /// The result is position-independent (offsets are relative), so a
    /// comprehension can itself appear inside another comprehension's
    /// subexpressions.
    pub fn into_steps(self) -> Vec<Step> {
        let mut steps = Vec::new();

        steps.push(Step::Const(ConstStep::new(Value::Null)));
        steps.extend(self.iter_range);
        steps.push(Step::Const(ConstStep::new(Value::Int(-1))));
        steps.push(Step::Const(ConstStep::new(Value::Null)));
        steps.extend(self.accu_init);

        let next_pos = steps.len();
        steps.push(Step::ComprehensionNext(ComprehensionNextStep::new(
            self.accu_var.clone(),
            self.iter_var.clone(),
        )));
        steps.extend(self.loop_condition);

        let cond_pos = steps.len();
        steps.push(Step::ComprehensionCond(ComprehensionCondStep::new(
            self.iter_var.clone(),
            self.shortcircuit,
        )));
        steps.extend(self.loop_step);

        let back_pos = steps.len();
        steps.push(Step::Jump(JumpStep::new(Some(
            next_pos as isize - back_pos as isize,
        ))));

        let result_pos = steps.len();
        steps.extend(self.result);

        let finish_pos = steps.len();
        steps.push(Step::ComprehensionFinish(ComprehensionFinishStep::new(
            self.accu_var,
        )));
        let after_pos = steps.len();

        match &mut steps[next_pos] {
            Step::ComprehensionNext(s) => {
                s.jump_offset = Some((result_pos - next_pos) as isize);
                s.error_jump_offset = Some((after_pos - next_pos) as isize);
            }
            _ => unreachable!("comprehension layout: next step moved"),
        }
        match &mut steps[cond_pos] {
            Step::ComprehensionCond(s) => {
                s.jump_offset = Some((result_pos - cond_pos) as isize);
            }
            _ => unreachable!("comprehension layout: cond step moved"),
        }

        debug_assert!(matches!(steps[finish_pos], Step::ComprehensionFinish(_)));
        debug_assert!(
            matches!(&steps[back_pos], Step::Jump(s) if back_pos.checked_add_signed(s.offset.unwrap()).unwrap() == next_pos),
            "comprehension layout: back-edge must target the next step"
        );
        debug_assert!(next_pos < cond_pos && cond_pos < back_pos && back_pos < finish_pos);

        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(step: Step) -> Vec<Step> {
        vec![step]
    }

    fn sample() -> Comprehension {
        Comprehension {
            accu_var: "acc".into(),
            iter_var: "x".into(),
            shortcircuit: true,
            iter_range: single(Step::Ident(IdentStep::new("items"))),
            accu_init: single(Step::Const(ConstStep::new(Value::Int(0)))),
            loop_condition: single(Step::Const(ConstStep::new(Value::Bool(true)))),
            loop_step: single(Step::Ident(IdentStep::new("acc"))),
            result: single(Step::Ident(IdentStep::new("acc"))),
        }
    }

    #[test]
    fn test_comprehension_layout() {
        let steps = sample().into_steps();
        assert_eq!(steps.len(), 12);
        assert!(matches!(steps[0], Step::Const(_)));
        assert!(matches!(steps[1], Step::Ident(_)));
        assert!(matches!(steps[2], Step::Const(_)));
        assert!(matches!(steps[3], Step::Const(_)));
        assert!(matches!(steps[4], Step::Const(_)));
        let Step::ComprehensionNext(next) = &steps[5] else {
            panic!("expected next at 5");
        };
        assert_eq!(next.jump_offset, Some(5)); // 5 → 10, the result step
        assert_eq!(next.error_jump_offset, Some(7)); // 5 → 12, past finish
        let Step::ComprehensionCond(cond) = &steps[7] else {
            panic!("expected cond at 7");
        };
        assert_eq!(cond.jump_offset, Some(3)); // 7 → 10
        let Step::Jump(back) = &steps[9] else {
            panic!("expected back-edge at 9");
        };
        assert_eq!(back.offset, Some(-4)); // 9 → 5
        assert!(matches!(steps[11], Step::ComprehensionFinish(_)));
    }

    #[test]
    fn test_build_validates_offsets() {
        let mut builder = ProgramBuilder::new();
        builder.emit_comprehension(sample());
        let program = builder.build().unwrap();
        assert_eq!(program.len(), 12);

        let mut bad = ProgramBuilder::new();
        bad.emit(Step::Jump(JumpStep::new(Some(5))));
        assert_eq!(bad.build().unwrap_err(), VmError::JumpOutOfRange(5));

        let mut backward = ProgramBuilder::new();
        backward.emit(Step::Jump(JumpStep::new(Some(-1))));
        assert_eq!(backward.build().unwrap_err(), VmError::JumpOutOfRange(-1));

        // an unassigned offset is a runtime defect, not a build error
        let mut unset = ProgramBuilder::new();
        unset.emit(Step::Jump(JumpStep::new(None)));
        assert!(unset.build().is_ok());
    }

    #[test]
    fn test_program_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Program>();
    }
}
