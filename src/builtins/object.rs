//! Object built-ins (spec §4.8). Objects are insertion-ordered
//! string-keyed mappings (`Value::Object`), never by reference semantics
//! beyond identity comparison — `merge`/`clone` always produce fresh ones.

use super::{arg, arg_str, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("keys".into(), keys);
    r.insert("values".into(), values);
    r.insert("entries".into(), entries);
    r.insert("get".into(), get);
    r.insert("set".into(), set);
    r.insert("has".into(), has);
    r.insert("merge".into(), merge);
    r.insert("clone".into(), clone);
}

fn entries_of(v: &Value) -> Vec<(String, Value)> {
    v.as_object().map(|o| o.borrow().clone()).unwrap_or_default()
}

fn keys(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::array(entries_of(&arg(a, 0)).into_iter().map(|(k, _)| Value::string(k)).collect()))
}
fn values(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::array(entries_of(&arg(a, 0)).into_iter().map(|(_, v)| v).collect()))
}
fn entries(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::array(
        entries_of(&arg(a, 0))
            .into_iter()
            .map(|(k, v)| Value::array(vec![Value::string(k), v]))
            .collect(),
    ))
}
fn get(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let key = arg_str(a, 1);
    let found = entries_of(&arg(a, 0)).into_iter().find(|(k, _)| *k == key).map(|(_, v)| v);
    Ok(found.unwrap_or_else(|| arg(a, 2)))
}
/// Non-mutating: returns a new object with `key` set to `value`.
fn set(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let key = arg_str(a, 1);
    let value = arg(a, 2);
    let mut entries = entries_of(&arg(a, 0));
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
    if entries.len() > i.safety.max_object_keys {
        log::warn!("object exceeds MAX_OBJECT_KEYS, truncating");
        entries.truncate(i.safety.max_object_keys);
    }
    Ok(Value::object(entries))
}
fn has(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let key = arg_str(a, 1);
    Ok(Value::Bool(entries_of(&arg(a, 0)).iter().any(|(k, _)| *k == key)))
}
/// Right-hand keys win on conflict, matching object-literal redefinition order.
fn merge(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let mut entries = entries_of(&arg(a, 0));
    for (k, v) in entries_of(&arg(a, 1)) {
        match entries.iter_mut().find(|(ek, _)| *ek == k) {
            Some(slot) => slot.1 = v,
            None => entries.push((k, v)),
        }
    }
    if entries.len() > i.safety.max_object_keys {
        log::warn!("object exceeds MAX_OBJECT_KEYS, truncating");
        entries.truncate(i.safety.max_object_keys);
    }
    Ok(Value::object(entries))
}
fn clone(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::object(entries_of(&arg(a, 0))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostContext;
    use crate::safety::SafetyLimits;

    fn interp() -> Interpreter {
        Interpreter::new(HostContext::new(), SafetyLimits::default())
    }

    fn obj(pairs: Vec<(&str, Value)>) -> Value {
        Value::object(pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
    }

    #[test]
    fn get_falls_back_to_default() {
        let mut i = interp();
        let o = obj(vec![("a", Value::Number(1.0))]);
        let v = get(&mut i, &[o, Value::string("missing"), Value::string("fallback")], Position::start()).unwrap();
        assert_eq!(v, Value::string("fallback"));
    }

    #[test]
    fn set_does_not_mutate_the_original() {
        let mut i = interp();
        let o = obj(vec![("a", Value::Number(1.0))]);
        let updated = set(&mut i, &[o.clone(), Value::string("a"), Value::Number(2.0)], Position::start()).unwrap();
        assert_eq!(entries_of(&o)[0].1, Value::Number(1.0));
        assert_eq!(entries_of(&updated)[0].1, Value::Number(2.0));
    }

    #[test]
    fn merge_prefers_right_hand_values() {
        let mut i = interp();
        let a = obj(vec![("x", Value::Number(1.0))]);
        let b = obj(vec![("x", Value::Number(2.0)), ("y", Value::Number(3.0))]);
        let merged = merge(&mut i, &[a, b], Position::start()).unwrap();
        let entries = entries_of(&merged);
        assert_eq!(entries.iter().find(|(k, _)| k == "x").unwrap().1, Value::Number(2.0));
        assert_eq!(entries.iter().find(|(k, _)| k == "y").unwrap().1, Value::Number(3.0));
    }
}
