//! Step implementations.
//!
//! Each step states the stack depth it requires on entry and the shape it
//! leaves on every exit path; the driver dispatches on the closed
//! [`Step`](crate::program::Step) enum and the frame enforces the
//! contracts.

pub mod call;
pub mod comprehension;
pub mod const_value;
pub mod ident;
pub mod jump;

pub use call::CallStep;
pub use comprehension::{
    ComprehensionCondStep, ComprehensionFinishStep, ComprehensionNextStep, ListKeysStep,
};
pub use const_value::ConstStep;
pub use ident::IdentStep;
pub use jump::{CondJumpStep, ErrorJumpStep, JumpStep};
