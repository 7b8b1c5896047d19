//! Integration test harness for the verdict VM.
//!
//! Provides a registry of small native functions with per-function call
//! counters (so tests can assert what a program did and did not evaluate)
//! and builders for the program shapes the compiler emits: folds, exists
//! and map style comprehensions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use verdict_vm::steps::{CallStep, ConstStep, IdentStep};
use verdict_vm::{
    Bindings, Comprehension, EvalConfig, EvalError, Interpreter, Program, ProgramBuilder, Result,
    Step, Value,
};

/// The accumulator name the compiler reserves for macro expansions.
pub const ACCU_VAR: &str = "__result__";

/// Runs programs against an instrumented function registry.
pub struct TestHarness {
    registry: verdict_vm::FunctionRegistry,
    counters: HashMap<String, Arc<AtomicUsize>>,
}

impl TestHarness {
    pub fn new() -> Self {
        let mut harness = Self {
            registry: verdict_vm::FunctionRegistry::new(),
            counters: HashMap::new(),
        };
        harness.register_counted("add", |args| {
            match (args[0].as_int(), args[1].as_int()) {
                (Some(a), Some(b)) => Value::Int(a + b),
                _ => Value::error(EvalError::NoMatchingOverload),
            }
        });
        harness.register_counted("or", |args| {
            match (args[0].as_bool(), args[1].as_bool()) {
                (Some(a), Some(b)) => Value::Bool(a || b),
                _ => Value::error(EvalError::NoMatchingOverload),
            }
        });
        harness.register_counted("not", |args| match args[0].as_bool() {
            Some(b) => Value::Bool(!b),
            None => Value::error(EvalError::NoMatchingOverload),
        });
        harness.register_counted("eq", |args| Value::Bool(args[0] == args[1]));
        harness.register_counted("double", |args| match args[0].as_int() {
            Some(v) => Value::Int(v * 2),
            None => Value::error(EvalError::NoMatchingOverload),
        });
        harness.register_counted("append", |args| match args[0].as_list() {
            Some(items) => {
                let mut items = items.to_vec();
                items.push(args[1].clone());
                Value::from(items)
            }
            None => Value::error(EvalError::NoMatchingOverload),
        });
        harness
    }

    /// Register a function wrapped with an invocation counter.
    pub fn register_counted(
        &mut self,
        name: &str,
        function: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) {
        let counter = Arc::new(AtomicUsize::new(0));
        self.counters.insert(name.to_string(), counter.clone());
        self.registry.register(name, move |args| {
            counter.fetch_add(1, Ordering::Relaxed);
            function(args)
        });
    }

    /// How many times a registered function has been invoked.
    pub fn calls(&self, name: &str) -> usize {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn run(&self, program: &Program, activation: &Bindings) -> Result<Value> {
        self.run_with_budget(program, activation, 0)
    }

    pub fn run_with_budget(
        &self,
        program: &Program,
        activation: &Bindings,
        max_iterations: u64,
    ) -> Result<Value> {
        let config = EvalConfig { max_iterations };
        Interpreter::new(program, &self.registry).evaluate(activation, &config)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn ident(name: &str) -> Step {
    Step::Ident(IdentStep::new(name))
}

fn constant(value: Value) -> Step {
    Step::Const(ConstStep::new(value))
}

fn call(name: &str, arg_count: usize) -> Step {
    Step::Call(CallStep::new(name, arg_count))
}

/// `sum(items)` as the compiler emits it: a fold with `add`.
pub fn sum_comprehension(items_var: &str) -> Comprehension {
    Comprehension {
        accu_var: ACCU_VAR.to_string(),
        iter_var: "x".to_string(),
        shortcircuit: false,
        iter_range: vec![ident(items_var)],
        accu_init: vec![constant(Value::Int(0))],
        loop_condition: vec![constant(Value::Bool(true))],
        loop_step: vec![ident(ACCU_VAR), ident("x"), call("add", 2)],
        result: vec![ident(ACCU_VAR)],
    }
}

pub fn sum_program(items_var: &str) -> Program {
    let mut builder = ProgramBuilder::new();
    builder.emit_comprehension(sum_comprehension(items_var));
    builder.build().expect("sum program must assemble")
}

/// `items.exists(x, x)` over a list of booleans: short-circuiting
/// disjunction with `or`, continuing while the accumulator is still false.
pub fn exists_program(items_var: &str) -> Program {
    let mut builder = ProgramBuilder::new();
    builder.emit_comprehension(Comprehension {
        accu_var: ACCU_VAR.to_string(),
        iter_var: "x".to_string(),
        shortcircuit: true,
        iter_range: vec![ident(items_var)],
        accu_init: vec![constant(Value::Bool(false))],
        loop_condition: vec![ident(ACCU_VAR), call("not", 1)],
        loop_step: vec![ident(ACCU_VAR), ident("x"), call("or", 2)],
        result: vec![ident(ACCU_VAR)],
    });
    builder.build().expect("exists program must assemble")
}

/// `keys.exists(x, x == needle)` over the keys of a map binding.
pub fn exists_key_program(map_var: &str, needle: &str) -> Program {
    let mut builder = ProgramBuilder::new();
    builder.emit_comprehension(Comprehension {
        accu_var: ACCU_VAR.to_string(),
        iter_var: "x".to_string(),
        shortcircuit: true,
        iter_range: vec![ident(map_var), Step::ListKeys(verdict_vm::steps::ListKeysStep)],
        accu_init: vec![constant(Value::Bool(false))],
        loop_condition: vec![ident(ACCU_VAR), call("not", 1)],
        loop_step: vec![
            ident(ACCU_VAR),
            ident("x"),
            constant(Value::from(needle)),
            call("eq", 2),
            call("or", 2),
        ],
        result: vec![ident(ACCU_VAR)],
    });
    builder.build().expect("exists-key program must assemble")
}

/// `items.map(x, double(x))`: a fold that appends into a list accumulator.
pub fn map_double_program(items_var: &str) -> Program {
    let mut builder = ProgramBuilder::new();
    builder.emit_comprehension(Comprehension {
        accu_var: ACCU_VAR.to_string(),
        iter_var: "x".to_string(),
        shortcircuit: false,
        iter_range: vec![ident(items_var)],
        accu_init: vec![constant(Value::from(Vec::new()))],
        loop_condition: vec![constant(Value::Bool(true))],
        loop_step: vec![
            ident(ACCU_VAR),
            ident("x"),
            call("double", 1),
            call("append", 2),
        ],
        result: vec![ident(ACCU_VAR)],
    });
    builder.build().expect("map program must assemble")
}

/// Helper for building activations.
pub fn activation(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Bindings {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Helper for building integer list values.
pub fn int_list(items: impl IntoIterator<Item = i64>) -> Value {
    Value::from(items.into_iter().map(Value::Int).collect::<Vec<_>>())
}
