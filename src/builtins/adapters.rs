//! Dialog/System/Terminal built-ins (spec §4.8): thin wrappers over
//! [`crate::host::AppRegistry`] that let scripts reach the same host
//! actions the `alert`/`confirm`/`launch`/… statements trigger, but from
//! expression position. Safely return `null`/`false` when no host is wired
//! in, mirroring the statement forms' graceful degradation.

use super::{arg_str, BuiltinRegistry};
use crate::error::{RuntimeError, ScriptResult};
use crate::interpreter::Interpreter;
use crate::position::Position;
use crate::value::Value;

pub fn register(r: &mut BuiltinRegistry) {
    r.insert("getApps".into(), get_apps);
    r.insert("launch".into(), launch);
    r.insert("alert".into(), alert);
    r.insert("confirm".into(), confirm);
    r.insert("prompt".into(), prompt);
    r.insert("notify".into(), notify);
    r.insert("play".into(), play);
    r.insert("stop".into(), stop);
    r.insert("video".into(), video);
    r.insert("runCommand".into(), run_command);
}

fn get_apps(i: &mut Interpreter, _a: &[Value], _p: Position) -> ScriptResult<Value> {
    match i.host.app_registry.as_mut() {
        Some(registry) => Ok(Value::array(registry.get_all().unwrap_or_default())),
        None => Ok(Value::array(vec![])),
    }
}
fn launch(i: &mut Interpreter, a: &[Value], p: Position) -> ScriptResult<Value> {
    let id = arg_str(a, 0);
    match i.host.app_registry.as_mut() {
        Some(registry) => registry
            .launch(&id, vec![])
            .map_err(|e| RuntimeError::in_builtin("launch", e.to_string(), p).into()),
        None => Ok(Value::Null),
    }
}
fn alert(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let message = arg_str(a, 0);
    if let Some(registry) = i.host.app_registry.as_mut() {
        let _ = registry.alert(&message);
    }
    Ok(Value::Null)
}
fn confirm(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let message = arg_str(a, 0);
    let answered = match i.host.app_registry.as_mut() {
        Some(registry) => registry.confirm(&message).unwrap_or(true),
        None => true,
    };
    Ok(Value::Bool(answered))
}
fn prompt(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let message = arg_str(a, 0);
    let default = a.get(1).map(Value::display_string);
    let answer = match i.host.app_registry.as_mut() {
        Some(registry) => registry.prompt(&message, default.as_deref()).unwrap_or(default.clone()),
        None => default,
    };
    Ok(match answer {
        Some(s) => Value::string(s),
        None => Value::string(""),
    })
}
fn notify(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let message = arg_str(a, 0);
    if let Some(registry) = i.host.app_registry.as_mut() {
        let _ = registry.notify(&message);
    }
    Ok(Value::Null)
}
fn play(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let source = arg_str(a, 0);
    if let Some(registry) = i.host.app_registry.as_mut() {
        let _ = registry.play(&source, vec![]);
    }
    Ok(Value::Null)
}
fn stop(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let source = a.get(0).map(Value::display_string);
    if let Some(registry) = i.host.app_registry.as_mut() {
        let _ = registry.stop(source.as_deref());
    }
    Ok(Value::Null)
}
fn video(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let source = arg_str(a, 0);
    if let Some(registry) = i.host.app_registry.as_mut() {
        let _ = registry.video(&source, vec![]);
    }
    Ok(Value::Null)
}
fn run_command(i: &mut Interpreter, a: &[Value], _p: Position) -> ScriptResult<Value> {
    let name = arg_str(a, 0);
    let rest: Vec<Value> = a.iter().skip(1).cloned().collect();
    match i.host.app_registry.as_mut() {
        Some(registry) => Ok(registry.run_command(&name, rest).unwrap_or(Value::Null)),
        None => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::HeadlessAppRegistry;
    use crate::host::HostContext;
    use crate::safety::SafetyLimits;

    fn interp_with_registry() -> Interpreter {
        let mut host = HostContext::new();
        host.app_registry = Some(Box::new(HeadlessAppRegistry::default()));
        Interpreter::new(host, SafetyLimits::default())
    }

    #[test]
    fn confirm_defaults_to_true_when_host_absent() {
        let mut i = Interpreter::new(HostContext::new(), SafetyLimits::default());
        let v = confirm(&mut i, &[Value::string("ok?")], Position::start()).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn prompt_returns_default_when_host_absent() {
        let mut i = Interpreter::new(HostContext::new(), SafetyLimits::default());
        let v = prompt(&mut i, &[Value::string("name?"), Value::string("anon")], Position::start()).unwrap();
        assert_eq!(v, Value::string("anon"));
    }

    #[test]
    fn get_apps_is_empty_without_registry() {
        let mut i = Interpreter::new(HostContext::new(), SafetyLimits::default());
        let v = get_apps(&mut i, &[], Position::start()).unwrap();
        assert_eq!(v, Value::array(vec![]));
    }

    #[test]
    fn launch_routes_through_app_registry_when_present() {
        let mut i = interp_with_registry();
        let v = launch(&mut i, &[Value::string("calculator")], Position::start()).unwrap();
        assert_eq!(v, Value::string("calculator"));
    }
}
