//! Built-in function registry (spec §4.8).
//!
//! Every built-in shares one signature and is looked up by a single flat
//! name — `call sort $arr`, `call fib $a` — exactly like a user function,
//! matching the grammar's `call name arg*` (there is no dotted/namespaced
//! call syntax). Each family lives in its own submodule and registers its
//! names into the shared map.

use std::collections::HashMap;

use crate::error::{RuntimeError, ScriptResult};
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub mod adapters;
pub mod array;
pub mod debug;
pub mod json;
pub mod math;
pub mod object;
pub mod string;
pub mod time;
pub mod type_ops;

pub type BuiltinFn = fn(&mut Interpreter, &[Value], Position) -> ScriptResult<Value>;
pub type BuiltinRegistry = HashMap<String, BuiltinFn>;

pub fn register_all(registry: &mut BuiltinRegistry) {
    math::register(registry);
    string::register(registry);
    array::register(registry);
    object::register(registry);
    type_ops::register(registry);
    time::register(registry);
    json::register(registry);
    debug::register(registry);
    adapters::register(registry);
}

// ---- shared argument-coercion helpers (spec §4.8: "accepts loose inputs
// and coerces via the type rules; failures return neutral values") -------

pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

pub(crate) fn arg_num(args: &[Value], i: usize) -> f64 {
    arg(args, i).to_number()
}

pub(crate) fn arg_num_or(args: &[Value], i: usize, default: f64) -> f64 {
    match args.get(i) {
        Some(v) => v.to_number(),
        None => default,
    }
}

pub(crate) fn arg_str(args: &[Value], i: usize) -> String {
    arg(args, i).display_string()
}

pub(crate) fn arg_array(args: &[Value], i: usize) -> Vec<Value> {
    arg(args, i).as_array().map(|a| a.borrow().clone()).unwrap_or_default()
}

pub(crate) fn assertion_failed(message: impl Into<String>, pos: Position) -> crate::error::ScriptError {
    RuntimeError::new(message, pos).into()
}
