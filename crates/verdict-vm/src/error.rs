//! Evaluation and machine errors.
//!
//! Two disjoint classes. [`EvalError`] is a language-level outcome: it rides
//! the value stack inside [`Value::Error`](crate::value::Value::Error) so
//! later steps can inspect, compare, or propagate it. [`VmError`] aborts the
//! evaluation outright: it is either a defect in the compiled program (the
//! compiler violated a stack-shape contract) or an exhausted iteration
//! budget, and is never representable as a stack value.

use thiserror::Error;

/// Result type used throughout the interpreter.
pub type Result<T> = std::result::Result<T, VmError>;

/// A failure that is itself a value.
///
/// Errors of this kind are produced during evaluation (an identifier missing
/// from the bindings, a call with no matching overload) and travel on the
/// stack like any other value, enabling short-circuit propagation without a
/// separate exception channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("no matching overload")]
    NoMatchingOverload,

    #[error("undeclared reference to '{0}'")]
    UndeclaredReference(String),

    #[error("{0}")]
    Message(String),
}

/// A failure that terminates the evaluation.
///
/// Every variant except [`VmError::ResourceExhausted`] indicates a malformed
/// program: the step sequence demanded a stack shape or jump target the
/// frame cannot honor. These are surfaced verbatim to the caller and must
/// never be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("value stack underflow")]
    StackUnderflow,

    #[error("{context}: want {want}, got {got}")]
    TypeMismatch {
        context: &'static str,
        want: &'static str,
        got: &'static str,
    },

    #[error("jump offset not set")]
    JumpOffsetUnset,

    #[error("jump target {0} out of range")]
    JumpOutOfRange(i64),

    #[error("iteration budget of {0} exceeded")]
    ResourceExhausted(u64),

    #[error("evaluation finished with {0} values on the stack")]
    UnbalancedStack(usize),
}

impl VmError {
    /// True when the error indicates a malformed program rather than an
    /// exhausted budget.
    pub fn is_defect(&self) -> bool {
        !matches!(self, VmError::ResourceExhausted(_))
    }
}
