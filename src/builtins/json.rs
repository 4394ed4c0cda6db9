//! JSON built-ins (spec §4.8), backed by `serde_json` with
//! `preserve_order` so object key order survives `toJSON`/`fromJSON`
//! round-trips, matching RS's insertion-ordered object semantics.

use serde_json::{Map, Value as Json};

use super::{arg, arg_str, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("toJSON".into(), to_json);
    r.insert("fromJSON".into(), from_json);
    r.insert("prettyJSON".into(), pretty_json);
}

fn to_json(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(to_json_string(&arg(a, 0), false)))
}
fn pretty_json(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(to_json_string(&arg(a, 0), true)))
}
/// Returns `null` when the input isn't valid JSON, matching the builtin
/// contract's "failures return neutral values" rule.
fn from_json(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    Ok(match serde_json::from_str::<Json>(&s) {
        Ok(json) => from_json_value(&json),
        Err(_) => Value::Null,
    })
}

/// Used by [`crate::value::Value::display_string`] to stringify arrays and
/// objects for `print`/interpolation, as well as by the builtins above.
pub fn to_json_string(value: &Value, pretty: bool) -> String {
    let json = to_json_value(value);
    if pretty {
        serde_json::to_string_pretty(&json).unwrap_or_else(|_| "null".to_owned())
    } else {
        serde_json::to_string(&json).unwrap_or_else(|_| "null".to_owned())
    }
}

/// Mirrors `value::format_number`'s integer-vs-float split so round-tripped
/// numbers print the same way through JSON as they do through `display_string`.
fn json_number(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Json::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

fn to_json_value(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => json_number(*n),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(a) => Json::Array(a.borrow().iter().map(to_json_value).collect()),
        Value::Object(o) => {
            let mut map = Map::new();
            for (k, v) in o.borrow().iter() {
                map.insert(k.clone(), to_json_value(v));
            }
            Json::Object(map)
        }
    }
}

fn from_json_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
        Json::String(s) => Value::string(s.clone()),
        Json::Array(items) => Value::array(items.iter().map(from_json_value).collect()),
        Json::Object(map) => Value::object(map.iter().map(|(k, v)| (k.clone(), from_json_value(v))).collect()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::HostContext;
    use crate::safety::SafetyLimits;

    fn interp() -> Interpreter {
        Interpreter::new(HostContext::new(), SafetyLimits::default())
    }

    #[test]
    fn object_round_trips_preserving_key_order() {
        let mut i = interp();
        let obj = Value::object(vec![("b".into(), Value::Number(1.0)), ("a".into(), Value::Number(2.0))]);
        let json = to_json(&mut i, &[obj], Position::start()).unwrap();
        assert_eq!(json, Value::string(r#"{"b":1,"a":2}"#));
        let back = from_json(&mut i, &[json], Position::start()).unwrap();
        let entries = back.as_object().unwrap().borrow().clone();
        assert_eq!(entries[0].0, "b");
        assert_eq!(entries[1].0, "a");
    }

    #[test]
    fn malformed_json_yields_null() {
        let mut i = interp();
        let v = from_json(&mut i, &[Value::string("{not json")], Position::start()).unwrap();
        assert_eq!(v, Value::Null);
    }
}
