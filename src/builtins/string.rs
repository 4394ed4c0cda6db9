//! String built-ins (spec §4.8). Clamps per §4.4 apply to `concat`,
//! `repeat`, and `padStart`/`padEnd`.

use super::{arg_num_or, arg_str, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("upper".into(), upper);
    r.insert("lower".into(), lower);
    r.insert("trim".into(), trim);
    r.insert("trimStart".into(), trim_start);
    r.insert("trimEnd".into(), trim_end);
    r.insert("length".into(), length);
    r.insert("charAt".into(), char_at);
    r.insert("charCode".into(), char_code);
    r.insert("fromCharCode".into(), from_char_code);
    r.insert("concat".into(), concat);
    r.insert("substr".into(), substr);
    r.insert("substring".into(), substring);
    r.insert("slice".into(), slice);
    r.insert("indexOf".into(), index_of);
    r.insert("lastIndexOf".into(), last_index_of);
    r.insert("contains".into(), contains);
    r.insert("startsWith".into(), starts_with);
    r.insert("endsWith".into(), ends_with);
    r.insert("replace".into(), replace);
    r.insert("replaceAll".into(), replace_all);
    r.insert("split".into(), split);
    r.insert("join".into(), join);
    r.insert("padStart".into(), pad_start);
    r.insert("padEnd".into(), pad_end);
    r.insert("repeat".into(), repeat);
    r.insert("reverse".into(), reverse);
}

fn upper(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_str(a, 0).to_uppercase()))
}
fn lower(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_str(a, 0).to_lowercase()))
}
fn trim(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_str(a, 0).trim().to_owned()))
}
fn trim_start(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_str(a, 0).trim_start().to_owned()))
}
fn trim_end(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_str(a, 0).trim_end().to_owned()))
}
fn length(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_str(a, 0).chars().count() as f64))
}
fn char_at(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let idx = arg_num_or(a, 1, 0.0);
    if idx < 0.0 {
        return Ok(Value::string(""));
    }
    Ok(match s.chars().nth(idx as usize) {
        Some(c) => Value::string(c.to_string()),
        None => Value::string(""),
    })
}
fn char_code(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let idx = arg_num_or(a, 1, 0.0).max(0.0) as usize;
    Ok(match s.chars().nth(idx) {
        Some(c) => Value::Number(c as u32 as f64),
        None => Value::Number(0.0),
    })
}
fn from_char_code(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let code = arg_num_or(a, 0, 0.0) as u32;
    Ok(Value::string(char::from_u32(code).map(|c| c.to_string()).unwrap_or_default()))
}
fn concat(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let joined: String = a.iter().map(Value::display_string).collect();
    Ok(Value::string(i.safety.clamp_string_length(joined)))
}

/// Byte-index-free `substr(str, start, len?)` over Unicode scalar values.
fn substr(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let chars: Vec<char> = s.chars().collect();
    let start = arg_num_or(a, 1, 0.0).max(0.0) as usize;
    let len = a.get(2).map(|v| v.to_number().max(0.0) as usize).unwrap_or(chars.len());
    let end = (start + len).min(chars.len());
    if start >= chars.len() {
        return Ok(Value::string(""));
    }
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}
fn substring(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let chars: Vec<char> = s.chars().collect();
    let mut start = arg_num_or(a, 1, 0.0).max(0.0) as usize;
    let mut end = arg_num_or(a, 2, chars.len() as f64).max(0.0) as usize;
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    let end = end.min(chars.len());
    let start = start.min(end);
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}
fn slice(i: &mut Interpreter, a: &[Value], p: Position) -> ScriptResult<Value> {
    substring(i, a, p)
}
fn index_of(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let haystack = arg_str(a, 0);
    let needle = arg_str(a, 1);
    Ok(Value::Number(match haystack.find(&needle) {
        Some(byte_idx) => haystack[..byte_idx].chars().count() as f64,
        None => -1.0,
    }))
}
fn last_index_of(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let haystack = arg_str(a, 0);
    let needle = arg_str(a, 1);
    Ok(Value::Number(match haystack.rfind(&needle) {
        Some(byte_idx) => haystack[..byte_idx].chars().count() as f64,
        None => -1.0,
    }))
}
fn contains(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(arg_str(a, 0).contains(&arg_str(a, 1))))
}
fn starts_with(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(arg_str(a, 0).starts_with(&arg_str(a, 1))))
}
fn ends_with(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Bool(arg_str(a, 0).ends_with(&arg_str(a, 1))))
}
fn replace(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let from = arg_str(a, 1);
    let to = arg_str(a, 2);
    Ok(Value::string(s.replacen(&from, &to, 1)))
}
fn replace_all(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let from = arg_str(a, 1);
    let to = arg_str(a, 2);
    Ok(Value::string(i.safety.clamp_string_length(s.replace(&from, &to))))
}
fn split(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let sep = arg_str(a, 1);
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        s.split(sep.as_str()).map(Value::string).collect()
    };
    Ok(Value::array(parts))
}
fn join(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let items = super::arg_array(a, 0);
    let sep = a.get(1).map(|v| v.display_string()).unwrap_or_else(|| ",".to_owned());
    let joined = items.iter().map(Value::display_string).collect::<Vec<_>>().join(&sep);
    Ok(Value::string(joined))
}
fn pad_start(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(i.safety.clamp_string_length(pad(&arg_str(a, 0), a, true))))
}
fn pad_end(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(i.safety.clamp_string_length(pad(&arg_str(a, 0), a, false))))
}
fn pad(s: &str, a: &[Value], at_start: bool) -> String {
    let target_len = arg_num_or(a, 1, 0.0).max(0.0) as usize;
    let pad_str = a.get(2).map(|v| v.display_string()).unwrap_or_else(|| " ".to_owned());
    let current = s.chars().count();
    if current >= target_len || pad_str.is_empty() {
        return s.to_owned();
    }
    let needed = target_len - current;
    let pad_chars: Vec<char> = pad_str.chars().collect();
    let filler: String = (0..needed).map(|i| pad_chars[i % pad_chars.len()]).collect();
    if at_start {
        format!("{filler}{s}")
    } else {
        format!("{s}{filler}")
    }
}
fn repeat(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let n = (arg_num_or(a, 1, 0.0).max(0.0) as usize).min(10_000);
    Ok(Value::string(i.safety.clamp_string_length(s.repeat(n))))
}
fn reverse(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_str(a, 0).chars().rev().collect::<String>()))
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
    fn upper_is_idempotent() {
        let mut i = interp();
        let once = upper(&mut i, &[Value::string("MiXeD")], Position::start()).unwrap();
        let twice = upper(&mut i, &[once.clone()], Position::start()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn repeat_is_capped_at_10000() {
        let mut i = interp();
        let v = repeat(&mut i, &[Value::string("a"), Value::Number(50_000.0)], Position::start()).unwrap();
        assert_eq!(v.as_str().unwrap().len(), 10_000);
    }

    #[test]
    fn pad_start_adds_leading_characters() {
        let mut i = interp();
        let v = pad_start(&mut i, &[Value::string("7"), Value::Number(3.0), Value::string("0")], Position::start())
            .unwrap();
        assert_eq!(v, Value::string("007"));
    }
}
