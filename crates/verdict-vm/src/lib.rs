//! Verdict VM - stack-machine interpreter for compiled policy expressions.
//!
//! Runs a previously compiled, linear step sequence against a value stack
//! and a variable-binding environment, producing one result value per
//! invocation. Designed to evaluate untrusted or semi-trusted expressions
//! many times per request: programs are immutable and shared, every
//! evaluation owns its state exclusively, and loop work is bounded by a
//! per-evaluation iteration budget.
//!
//! Evaluation failures come in two disjoint classes: language-level
//! outcomes ride the stack as error values and short-circuit through the
//! program, while contract violations (stack underflow, bad jump targets)
//! abort with a defect error — see [`error`].

pub mod adapter;
pub mod arena;
pub mod bindings;
pub mod error;
pub mod frame;
pub mod interpreter;
pub mod program;
pub mod registry;
pub mod stack;
pub mod steps;
pub mod value;

pub use adapter::{FieldError, HostRecord};
pub use arena::EvalArena;
pub use bindings::Bindings;
pub use error::{EvalError, Result, VmError};
pub use frame::{EvalConfig, ExecutionFrame};
pub use interpreter::{evaluate, Interpreter};
pub use program::{Comprehension, Program, ProgramBuilder, Step};
pub use registry::{FunctionRegistry, NativeFunction};
pub use stack::ValueStack;
pub use value::{MapKey, MapValue, UnknownSet, Value};
