//! Time/date built-ins (spec §4.8), backed by `chrono`. All calendar
//! calculations use the local timezone, matching a desktop environment's
//! wall clock rather than UTC.

use chrono::{DateTime, Datelike, Duration, Local, TimeZone, Timelike};

use super::{arg_num, arg_num_or, arg_str, BuiltinRegistry};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("now".into(), now);
    r.insert("timestamp".into(), timestamp);
    r.insert("time".into(), time);
    r.insert("date".into(), date);
    r.insert("datetime".into(), datetime);
    r.insert("year".into(), year);
    r.insert("month".into(), month);
    r.insert("day".into(), day);
    r.insert("weekday".into(), weekday);
    r.insert("hour".into(), hour);
    r.insert("minute".into(), minute);
    r.insert("second".into(), second);
    r.insert("millisecond".into(), millisecond);
    r.insert("elapsed".into(), elapsed);
    r.insert("addDays".into(), add_days);
    r.insert("addHours".into(), add_hours);
    r.insert("addMinutes".into(), add_minutes);
    r.insert("addSeconds".into(), add_seconds);
    r.insert("formatDate".into(), format_date);
    r.insert("formatTime".into(), format_time);
    r.insert("parseDate".into(), parse_date);
    r.insert("toISO".into(), to_iso);
}

/// Every time value crossing the script boundary is a millisecond epoch
/// timestamp (`Value::Number`), matching `now()`/`timestamp()`'s return type.
fn from_millis(ms: f64) -> DateTime<Local> {
    Local.timestamp_millis_opt(ms as i64).single().unwrap_or_else(Local::now)
}

fn arg_datetime(a: &[Value], i: usize) -> DateTime<Local> {
    match a.get(i) {
        Some(v) => from_millis(v.to_number()),
        None => Local::now(),
    }
}

fn now(_i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(Local::now().timestamp_millis() as f64))
}
fn timestamp(_i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(Local::now().timestamp_millis() as f64))
}
fn time(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_datetime(a, 0).format("%H:%M:%S").to_string()))
}
fn date(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_datetime(a, 0).format("%Y-%m-%d").to_string()))
}
fn datetime(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_datetime(a, 0).format("%Y-%m-%d %H:%M:%S").to_string()))
}
fn year(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).year() as f64))
}
fn month(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).month() as f64))
}
fn day(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).day() as f64))
}
fn weekday(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).weekday().num_days_from_sunday() as f64))
}
fn hour(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).hour() as f64))
}
fn minute(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).minute() as f64))
}
fn second(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number(arg_datetime(a, 0).second() as f64))
}
fn millisecond(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::Number((arg_datetime(a, 0).timestamp_subsec_millis()) as f64))
}
/// `elapsed(since)`: milliseconds between `since` (an epoch-ms value, as
/// returned by `timeStart`/`now`) and the current instant.
fn elapsed(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let since = arg_num(a, 0);
    Ok(Value::Number((Local::now().timestamp_millis() as f64 - since).max(0.0)))
}

fn add_days(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let dt = arg_datetime(a, 0) + Duration::days(arg_num_or(a, 1, 0.0) as i64);
    Ok(Value::Number(dt.timestamp_millis() as f64))
}
fn add_hours(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let dt = arg_datetime(a, 0) + Duration::hours(arg_num_or(a, 1, 0.0) as i64);
    Ok(Value::Number(dt.timestamp_millis() as f64))
}
fn add_minutes(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let dt = arg_datetime(a, 0) + Duration::minutes(arg_num_or(a, 1, 0.0) as i64);
    Ok(Value::Number(dt.timestamp_millis() as f64))
}
fn add_seconds(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let dt = arg_datetime(a, 0) + Duration::seconds(arg_num_or(a, 1, 0.0) as i64);
    Ok(Value::Number(dt.timestamp_millis() as f64))
}

fn format_date(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let fmt = a.get(1).map(Value::display_string).unwrap_or_else(|| "%Y-%m-%d".to_owned());
    Ok(Value::string(arg_datetime(a, 0).format(&fmt).to_string()))
}
fn format_time(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let fmt = a.get(1).map(Value::display_string).unwrap_or_else(|| "%H:%M:%S".to_owned());
    Ok(Value::string(arg_datetime(a, 0).format(&fmt).to_string()))
}
/// Parses an ISO-ish `YYYY-MM-DD[ HH:MM:SS]` string; returns `null` on
/// failure rather than erroring, matching the builtin contract's "failures
/// return neutral values" rule.
fn parse_date(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let s = arg_str(a, 0);
    let parsed = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(|d| d.and_hms_opt(0, 0, 0).unwrap()));
    Ok(match parsed {
        Ok(naive) => match Local.from_local_datetime(&naive).single() {
            Some(dt) => Value::Number(dt.timestamp_millis() as f64),
            None => Value::Null,
        },
        Err(_) => Value::Null,
    })
}
fn to_iso(_i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    Ok(Value::string(arg_datetime(a, 0).to_rfc3339()))
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
    fn format_date_round_trips_through_parse_date() {
        let mut i = interp();
        let formatted = format_date(&mut i, &[Value::Number(0.0)], Position::start()).unwrap();
        let parsed = parse_date(&mut i, &[formatted], Position::start()).unwrap();
        assert!(matches!(parsed, Value::Number(_)));
    }

    #[test]
    fn parse_date_returns_null_on_garbage_input() {
        let mut i = interp();
        let v = parse_date(&mut i, &[Value::string("not a date")], Position::start()).unwrap();
        assert_eq!(v, Value::Null);
    }

    #[test]
    fn elapsed_never_goes_negative() {
        let mut i = interp();
        let future = Local::now().timestamp_millis() as f64 + 100_000.0;
        let v = elapsed(&mut i, &[Value::Number(future)], Position::start()).unwrap();
        assert_eq!(v, Value::Number(0.0));
    }
}
