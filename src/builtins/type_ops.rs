//! Type predicates and coercions (spec §4.8). `isUndefined` always answers
//! `false` — RS has no distinct undefined value, only `null`, so the
//! predicate exists for API parity and never fires.

use super::{arg, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("typeof".into(), type_of);
    r.insert("isNumber".into(), is_number);
    r.insert("isString".into(), is_string);
    r.insert("isBoolean".into(), is_boolean);
    r.insert("isArray".into(), is_array);
    r.insert("isObject".into(), is_object);
    r.insert("isNull".into(), is_null);
    r.insert("isUndefined".into(), is_undefined);
    r.insert("isNaN".into(), is_nan);
    r.insert("isFinite".into(), is_finite);
    r.insert("isInteger".into(), is_integer);
    r.insert("isEmpty".into(), is_empty);
    r.insert("isNotEmpty".into(), is_not_empty);
    r.insert("toNumber".into(), to_number);
    r.insert("toInt".into(), to_int);
    r.insert("toFloat".into(), to_float);
    r.insert("toString".into(), to_string_fn);
    r.insert("toBoolean".into(), to_boolean);
    r.insert("toArray".into(), to_array);
    r.insert("toObject".into(), to_object);
    r.insert("default".into(), default_fn);
    r.insert("coalesce".into(), coalesce);
}

fn type_of(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg(a, 0).type_name()))
}
fn is_number(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(matches!(arg(a, 0), Value::Number(_))))
}
fn is_string(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(matches!(arg(a, 0), Value::String(_))))
}
fn is_boolean(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(matches!(arg(a, 0), Value::Bool(_))))
}
fn is_array(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(matches!(arg(a, 0), Value::Array(_))))
}
fn is_object(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(matches!(arg(a, 0), Value::Object(_))))
}
fn is_null(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(matches!(arg(a, 0), Value::Null)))
}
fn is_undefined(_i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(false))
}
fn is_nan(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(match arg(a, 0) {
        Value::Number(n) => n.is_nan(),
        _ => false,
    }))
}
fn is_finite(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(match arg(a, 0) {
        Value::Number(n) => n.is_finite(),
        _ => false,
    }))
}
fn is_integer(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(match arg(a, 0) {
        Value::Number(n) => n.is_finite() && n.fract() == 0.0,
        _ => false,
    }))
}
fn is_empty(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(match arg(a, 0) {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(arr) => arr.borrow().is_empty(),
        Value::Object(o) => o.borrow().is_empty(),
        _ => false,
    }))
}
fn is_not_empty(i: &mut Interpreter, a: &[Value], p: Position) -> ScriptResult<Value> {
    let empty = is_empty(i, a, p)?;
    Ok(Value::Bool(!empty.is_truthy()))
}

fn to_number(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg(a, 0).to_number()))
}
fn to_int(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg(a, 0).to_number().trunc()))
}
fn to_float(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg(a, 0).to_number()))
}
fn to_string_fn(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg(a, 0).display_string()))
}
fn to_boolean(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(arg(a, 0).is_truthy()))
}
fn to_array(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(match arg(a, 0) {
        v @ Value::Array(_) => v,
        Value::Null => Value::array(vec![]),
        other => Value::array(vec![other]),
    })
}
fn to_object(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(match arg(a, 0) {
        v @ Value::Object(_) => v,
        _ => Value::object(vec![]),
    })
}
/// `default(value, fallback)`: `fallback` if `value` is `null`, else `value`.
fn default_fn(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(match arg(a, 0) {
        Value::Null => arg(a, 1),
        v => v,
    })
}
/// First non-null argument, or `null` if all are null.
fn coalesce(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(a.iter().find(|v| !matches!(v, Value::Null)).cloned().unwrap_or(Value::Null))
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
    fn type_of_reports_each_domain_type() {
        let mut i = interp();
        assert_eq!(type_of(&mut i, &[Value::Null], Position::start()).unwrap(), Value::string("null"));
        assert_eq!(type_of(&mut i, &[Value::Number(1.0)], Position::start()).unwrap(), Value::string("number"));
        assert_eq!(type_of(&mut i, &[Value::array(vec![])], Position::start()).unwrap(), Value::string("array"));
    }

    #[test]
    fn is_undefined_is_always_false() {
        let mut i = interp();
        assert_eq!(is_undefined(&mut i, &[Value::Null], Position::start()).unwrap(), Value::Bool(false));
    }

    #[test]
    fn coalesce_picks_first_non_null() {
        let mut i = interp();
        let v = coalesce(&mut i, &[Value::Null, Value::Null, Value::Number(5.0)], Position::start()).unwrap();
        assert_eq!(v, Value::Number(5.0));
    }
}
