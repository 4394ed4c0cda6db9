//! Array built-ins (spec §4.8). `pop`/`shift` are non-mutating per §9's
//! redesign note; `push`/`unshift` mutate the underlying array in place.

use super::{arg, arg_array, arg_num_or, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("count".into(), count);
    r.insert("first".into(), first);
    r.insert("last".into(), last);
    r.insert("at".into(), at);
    r.insert("push".into(), push);
    r.insert("pop".into(), pop);
    r.insert("shift".into(), shift);
    r.insert("unshift".into(), unshift);
    r.insert("includes".into(), includes);
    r.insert("findIndex".into(), find_index);
    r.insert("find".into(), find);
    r.insert("sort".into(), sort);
    r.insert("sortDesc".into(), sort_desc);
    r.insert("unique".into(), unique);
    r.insert("flatten".into(), flatten);
    r.insert("range".into(), range);
    r.insert("fill".into(), fill);
    r.insert("sum".into(), sum);
    r.insert("avg".into(), avg);
    r.insert("product".into(), product);
    r.insert("filter".into(), filter);
    r.insert("reject".into(), reject);
    r.insert("map".into(), map);
    r.insert("splice".into(), splice);
    r.insert("arrayConcat".into(), array_concat);
}

fn count(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_array(a, 0).len() as f64))
}
fn first(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(arg_array(a, 0).into_iter().next().unwrap_or(Value::Null))
}
fn last(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(arg_array(a, 0).into_iter().last().unwrap_or(Value::Null))
}
fn at(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let items = arg_array(a, 0);
    let idx = arg_num_or(a, 1, 0.0);
    let resolved = if idx < 0.0 { items.len() as f64 + idx } else { idx };
    if resolved < 0.0 {
        return Ok(Value::Null);
    }
    Ok(items.get(resolved as usize).cloned().unwrap_or(Value::Null))
}

fn push(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let value = arg(a, 1);
    if let Some(arr) = arg(a, 0).as_array() {
        arr.borrow_mut().push(value);
        if arr.borrow().len() > i.safety.max_array_length {
            log::warn!("array length exceeds MAX_ARRAY_LENGTH, truncating");
            arr.borrow_mut().truncate(i.safety.max_array_length);
        }
        return Ok(Value::Array(arr));
    }
    Ok(arg(a, 0))
}
/// Non-mutating: returns the last element without changing the array.
fn pop(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(arg_array(a, 0).into_iter().last().unwrap_or(Value::Null))
}
/// Non-mutating: returns the first element without changing the array.
fn shift(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(arg_array(a, 0).into_iter().next().unwrap_or(Value::Null))
}
fn unshift(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let value = arg(a, 1);
    if let Some(arr) = arg(a, 0).as_array() {
        arr.borrow_mut().insert(0, value);
        if arr.borrow().len() > i.safety.max_array_length {
            log::warn!("array length exceeds MAX_ARRAY_LENGTH, truncating");
            arr.borrow_mut().truncate(i.safety.max_array_length);
        }
        return Ok(Value::Array(arr));
    }
    Ok(arg(a, 0))
}
fn includes(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let needle = arg(a, 1);
    Ok(Value::Bool(arg_array(a, 0).iter().any(|v| v.strict_eq(&needle))))
}
fn find_index(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let needle = arg(a, 1);
    Ok(Value::Number(
        arg_array(a, 0).iter().position(|v| v.strict_eq(&needle)).map(|i| i as f64).unwrap_or(-1.0),
    ))
}
fn find(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let needle = arg(a, 1);
    Ok(arg_array(a, 0).into_iter().find(|v| v.strict_eq(&needle)).unwrap_or(Value::Null))
}

fn all_numeric(items: &[Value]) -> bool {
    items.iter().all(|v| matches!(v, Value::Number(_)))
}

fn sort(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let mut items = arg_array(a, 0);
    sort_items(&mut items);
    Ok(Value::array(i.safety.clamp_array_length(items)))
}

fn sort_items(items: &mut [Value]) {
    if all_numeric(items) {
        items.sort_by(|a, b| a.to_number().partial_cmp(&b.to_number()).unwrap_or(std::cmp::Ordering::Equal));
    } else {
        items.sort_by(|a, b| a.display_string().cmp(&b.display_string()));
    }
}

fn sort_desc(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let mut items = arg_array(a, 0);
    sort_items(&mut items);
    items.reverse();
    Ok(Value::array(i.safety.clamp_array_length(items)))
}
fn unique(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let items = arg_array(a, 0);
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.iter().any(|v| v.strict_eq(&item)) {
            out.push(item);
        }
    }
    Ok(Value::array(i.safety.clamp_array_length(out)))
}
fn flatten_into(items: Vec<Value>, depth: u32, out: &mut Vec<Value>) {
    for item in items {
        match (&item, depth) {
            (Value::Array(inner), d) if d > 0 => flatten_into(inner.borrow().clone(), d - 1, out),
            _ => out.push(item),
        }
    }
}
fn flatten(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let items = arg_array(a, 0);
    let depth = arg_num_or(a, 1, 1.0).max(0.0) as u32;
    let mut out = Vec::new();
    flatten_into(items, depth, &mut out);
    Ok(Value::array(i.safety.clamp_array_length(out)))
}
fn range(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let start = arg_num_or(a, 0, 0.0);
    let end = arg_num_or(a, 1, 0.0);
    let step = arg_num_or(a, 2, 1.0);
    let mut out = Vec::new();
    if step != 0.0 {
        let mut current = start;
        while (step > 0.0 && current < end) || (step < 0.0 && current > end) {
            if out.len() as u64 >= i.safety.max_array_length as u64 {
                log::warn!("range() exceeds MAX_ARRAY_LENGTH, truncating");
                break;
            }
            out.push(Value::Number(current));
            current += step;
        }
    }
    Ok(Value::array(out))
}
fn fill(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let count = arg_num_or(a, 0, 0.0).max(0.0) as u64;
    let count = count.min(i.safety.max_array_length as u64);
    let value = arg(a, 1);
    Ok(Value::array(vec![value; count as usize]))
}
fn sum(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_array(a, 0).iter().map(Value::to_number).sum()))
}
fn avg(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let items = arg_array(a, 0);
    if items.is_empty() {
        return Ok(Value::Number(0.0));
    }
    let total: f64 = items.iter().map(Value::to_number).sum();
    Ok(Value::Number(total / items.len() as f64))
}
fn product(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_array(a, 0).iter().map(Value::to_number).product()))
}
fn filter(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let needle = arg(a, 1);
    let out: Vec<Value> = arg_array(a, 0).into_iter().filter(|v| v.strict_eq(&needle)).collect();
    Ok(Value::array(i.safety.clamp_array_length(out)))
}
fn reject(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let needle = arg(a, 1);
    let out: Vec<Value> = arg_array(a, 0).into_iter().filter(|v| !v.strict_eq(&needle)).collect();
    Ok(Value::array(i.safety.clamp_array_length(out)))
}
fn map(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let op = a.get(1).map(Value::display_string).unwrap_or_default();
    let out: Vec<Value> = arg_array(a, 0)
        .into_iter()
        .map(|v| match op.as_str() {
            "double" => Value::Number(v.to_number() * 2.0),
            "square" => Value::Number(v.to_number().powi(2)),
            "string" => Value::String(v.display_string()),
            "number" => Value::Number(v.to_number()),
            "boolean" => Value::Bool(v.is_truthy()),
            _ => v,
        })
        .collect();
    Ok(Value::array(i.safety.clamp_array_length(out)))
}
/// Non-mutating: returns the array with `deleteCount` elements removed at
/// `start` and any extra arguments spliced in at that position.
fn splice(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let items = arg_array(a, 0);
    let start = (arg_num_or(a, 1, 0.0).max(0.0) as usize).min(items.len());
    let delete_count = (arg_num_or(a, 2, 0.0).max(0.0) as usize).min(items.len() - start);
    let mut out: Vec<Value> = items[..start].to_vec();
    out.extend(a.iter().skip(3).cloned());
    out.extend(items[start + delete_count..].to_vec());
    Ok(Value::array(i.safety.clamp_array_length(out)))
}
fn array_concat(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let mut out = Vec::new();
    for v in a {
        match v.as_array() {
            Some(arr) => out.extend(arr.borrow().iter().cloned()),
            None => out.push(v.clone()),
        }
    }
    Ok(Value::array(i.safety.clamp_array_length(out)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostContext;
    use crate::safety::SafetyLimits;

    fn interp() -> Interpreter {
        Interpreter::new(HostContext::new(), SafetyLimits::default())
    }

    fn arr(items: Vec<Value>) -> Value {
        Value::array(items)
    }

    #[test]
    fn sort_is_idempotent_and_numeric() {
        let mut i = interp();
        let a = arr(vec![Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)]);
        let once = sort(&mut i, &[a], Position::start()).unwrap();
        let twice = sort(&mut i, &[once.clone()], Position::start()).unwrap();
        assert_eq!(once.as_array().unwrap().borrow().clone(), twice.as_array().unwrap().borrow().clone());
        assert_eq!(
            once.as_array().unwrap().borrow().iter().map(Value::to_number).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn pop_does_not_mutate_the_array() {
        let mut i = interp();
        let a = arr(vec![Value::Number(1.0), Value::Number(2.0)]);
        let popped = pop(&mut i, &[a.clone()], Position::start()).unwrap();
        assert_eq!(popped, Value::Number(2.0));
        assert_eq!(a.as_array().unwrap().borrow().len(), 2);
    }

    #[test]
    fn push_mutates_in_place() {
        let mut i = interp();
        let a = arr(vec![Value::Number(1.0)]);
        push(&mut i, &[a.clone(), Value::Number(2.0)], Position::start()).unwrap();
        assert_eq!(a.as_array().unwrap().borrow().len(), 2);
    }

    #[test]
    fn unique_preserves_first_occurrence_order() {
        let mut i = interp();
        let a = arr(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(1.0)]);
        let v = unique(&mut i, &[a], Position::start()).unwrap();
        assert_eq!(v.as_array().unwrap().borrow().iter().map(Value::to_number).collect::<Vec<_>>(), vec![1.0, 2.0]);
    }
}
