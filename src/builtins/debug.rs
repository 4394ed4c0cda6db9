//! Debug/introspection built-ins (spec §4.8). `assert*` failures surface as
//! ordinary runtime errors, catchable by `try`/`catch` like any other.

use std::time::Instant;

use super::{arg, arg_str, assertion_failed, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("debug".into(), debug);
    r.insert("inspect".into(), inspect);
    r.insert("assert".into(), assert_fn);
    r.insert("assertEqual".into(), assert_equal);
    r.insert("assertType".into(), assert_type);
    r.insert("trace".into(), trace);
    r.insert("timeStart".into(), time_start);
    r.insert("timeEnd".into(), time_end);
    r.insert("getCallStack".into(), get_call_stack);
    r.insert("dumpVars".into(), dump_vars);
}

fn debug(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    log::debug!("{}", arg(a, 0).display_string());
    Ok(arg(a, 0))
}
fn inspect(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(crate::builtins::json::to_json_string(&arg(a, 0), true)))
}
fn assert_fn(_i: &mut Interpreter, a: &[Value], p: Position) -> ScriptResult<Value> {
    if arg(a, 0).is_truthy() {
        Ok(Value::Bool(true))
    } else {
        let message = a.get(1).map(Value::display_string).unwrap_or_else(|| "assertion failed".to_owned());
        Err(assertion_failed(message, p))
    }
}
fn assert_equal(_i: &mut Interpreter, a: &[Value], p: Position) -> ScriptResult<Value> {
    let (lhs, rhs) = (arg(a, 0), arg(a, 1));
    if lhs.strict_eq(&rhs) {
        Ok(Value::Bool(true))
    } else {
        Err(assertion_failed(
            format!("assertEqual failed: {} != {}", lhs.display_string(), rhs.display_string()),
            p,
        ))
    }
}
fn assert_type(_i: &mut Interpreter, a: &[Value], p: Position) -> ScriptResult<Value> {
    let expected = arg_str(a, 1);
    let actual = arg(a, 0).type_name();
    if actual == expected {
        Ok(Value::Bool(true))
    } else {
        Err(assertion_failed(format!("assertType failed: expected {expected}, got {actual}"), p))
    }
}
fn trace(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    log::trace!("{} | stack: {:?}", arg(a, 0).display_string(), i.call_stack_names());
    Ok(Value::Null)
}
/// Starts (or restarts) a named stopwatch; paired with `timeEnd`.
fn time_start(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let label = arg_str(a, 0);
    i.timers.insert(label, Instant::now());
    Ok(Value::Null)
}
/// Returns elapsed milliseconds since the matching `timeStart`, or `0` if
/// the label was never started.
fn time_end(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let label = arg_str(a, 0);
    let elapsed = i.timers.remove(&label).map(|start| start.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);
    Ok(Value::Number(elapsed))
}
fn get_call_stack(i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::array(i.call_stack_names().into_iter().map(Value::string).collect()))
}
fn dump_vars(i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    let vars = i.variables();
    Ok(Value::object(vars.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostContext;
    use crate::safety::SafetyLimits;

    fn interp() -> Interpreter {
        Interpreter::new(HostContext::new(), SafetyLimits::default())
    }

    #[test]
    fn assert_passes_on_truthy_value() {
        let mut i = interp();
        assert!(assert_fn(&mut i, &[Value::Bool(true)], Position::start()).is_ok());
    }

    #[test]
    fn assert_fails_on_falsy_value() {
        let mut i = interp();
        assert!(assert_fn(&mut i, &[Value::Bool(false)], Position::start()).is_err());
    }

    #[test]
    fn time_end_without_matching_start_returns_zero() {
        let mut i = interp();
        let v = time_end(&mut i, &[Value::string("never-started")], Position::start()).unwrap();
        assert_eq!(v, Value::Number(0.0));
    }
}
