//! Math built-ins (spec §4.8).

use rand::Rng;

use super::{arg_num, arg_num_or, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("abs".into(), abs);
    r.insert("round".into(), round);
    r.insert("floor".into(), floor);
    r.insert("ceil".into(), ceil);
    r.insert("sqrt".into(), sqrt);
    r.insert("pow".into(), pow);
    r.insert("mod".into(), modulo);
    r.insert("sign".into(), sign);
    r.insert("min".into(), min);
    r.insert("max".into(), max);
    r.insert("clamp".into(), clamp);
    r.insert("random".into(), random);
    r.insert("sin".into(), sin);
    r.insert("cos".into(), cos);
    r.insert("tan".into(), tan);
    r.insert("asin".into(), asin);
    r.insert("acos".into(), acos);
    r.insert("atan".into(), atan);
    r.insert("atan2".into(), atan2);
    r.insert("exp".into(), exp);
    r.insert("log".into(), log);
    r.insert("log10".into(), log10);
    r.insert("log2".into(), log2);
    r.insert("PI".into(), pi);
    r.insert("E".into(), e);
}

fn abs(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).abs()))
}
fn round(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).round()))
}
fn floor(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).floor()))
}
fn ceil(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).ceil()))
}
fn sqrt(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).max(0.0).sqrt()))
}
fn pow(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).powf(arg_num(a, 1))))
}
fn modulo(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let divisor = arg_num(a, 1);
    Ok(Value::Number(if divisor == 0.0 { 0.0 } else { arg_num(a, 0) % divisor }))
}
fn sign(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let n = arg_num(a, 0);
    Ok(Value::Number(if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    }))
}

fn fold_numbers(a: &[Value], pick: impl Fn(f64, f64) -> f64) -> f64 {
    a.iter().map(|v| v.to_number()).fold(f64::NAN, |acc, n| if acc.is_nan() { n } else { pick(acc, n) })
}

fn min(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(if a.is_empty() { 0.0 } else { fold_numbers(a, f64::min) }))
}
fn max(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(if a.is_empty() { 0.0 } else { fold_numbers(a, f64::max) }))
}
fn clamp(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let (value, lo, hi) = (arg_num(a, 0), arg_num(a, 1), arg_num(a, 2));
    Ok(Value::Number(value.clamp(lo.min(hi), lo.max(hi))))
}

/// `random(min=0, max=1)` returns an integer in the inclusive range.
fn random(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let min = arg_num_or(a, 0, 0.0).round() as i64;
    let max = arg_num_or(a, 1, 1.0).round() as i64;
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let n = rand::thread_rng().gen_range(lo..=hi);
    Ok(Value::Number(n as f64))
}

fn sin(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).sin()))
}
fn cos(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).cos()))
}
fn tan(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).tan()))
}
fn asin(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).asin()))
}
fn acos(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).acos()))
}
fn atan(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).atan()))
}
fn atan2(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).atan2(arg_num(a, 1))))
}
fn exp(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).exp()))
}
fn log(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).ln()))
}
fn log10(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).log10()))
}
fn log2(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_num(a, 0).log2()))
}
fn pi(_i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(std::f64::consts::PI))
}
fn e(_i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(std::f64::consts::E))
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
    fn clamp_respects_bounds() {
        let mut i = interp();
        let v = clamp(&mut i, &[Value::Number(15.0), Value::Number(0.0), Value::Number(10.0)], Position::start());
        assert_eq!(v.unwrap(), Value::Number(10.0));
    }

    #[test]
    fn modulo_by_zero_yields_zero() {
        let mut i = interp();
        let v = modulo(&mut i, &[Value::Number(5.0), Value::Number(0.0)], Position::start());
        assert_eq!(v.unwrap(), Value::Number(0.0));
    }

    #[test]
    fn random_respects_inclusive_range() {
        let mut i = interp();
        for _ in 0..20 {
            let v = random(&mut i, &[Value::Number(1.0), Value::Number(3.0)], Position::start()).unwrap();
            let n = v.to_number();
            assert!((1.0..=3.0).contains(&n));
        }
    }
}
