//! Tree-walking evaluator (spec §4.3).
//!
//! Generalizes the teacher's `Interpreter { ast, Scope }` (flat
//! `Vec<HashMap>` stack, hardcoded `"print"` builtin) into a statement
//! visitor over a parent-linked [`Environment`], a real built-in registry,
//! and host-capability dispatch.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use crate::ast::{BinaryOp, Expr, InterpPart, Literal, NamedArgs, Stmt, UnaryOp};
use crate::builtins::{self, BuiltinRegistry};
use crate::environment::{Environment, EnvRef};
use crate::error::{RuntimeError, ScriptError, ScriptReferenceError, ScriptResult};
use crate::host::HostContext;
use crate::position::Position;
use crate::safety::SafetyLimits;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub closure: EnvRef,
}

#[derive(Clone)]
struct EventHandler {
    body: Vec<Stmt>,
    closure: EnvRef,
}

/// The control-flow signal a statement (or block) propagates upward.
enum Signal {
    None,
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter {
    pub(crate) global: EnvRef,
    functions: HashMap<String, Rc<UserFunction>>,
    event_handlers: HashMap<String, EventHandler>,
    pub(crate) safety: SafetyLimits,
    pub(crate) host: HostContext,
    call_stack: Vec<String>,
    cancelled: Rc<Cell<bool>>,
    builtins: BuiltinRegistry,
    output: Vec<String>,
    pub(crate) timers: HashMap<String, Instant>,
}

impl Interpreter {
    pub fn new(host: HostContext, safety: SafetyLimits) -> Self {
        let mut builtins = BuiltinRegistry::new();
        builtins::register_all(&mut builtins);
        Self {
            global: Environment::new(),
            functions: HashMap::new(),
            event_handlers: HashMap::new(),
            safety,
            host,
            call_stack: Vec::new(),
            cancelled: Rc::new(Cell::new(false)),
            builtins,
            output: Vec::new(),
            timers: HashMap::new(),
        }
    }

    pub(crate) fn call_stack_names(&self) -> Vec<String> {
        self.call_stack.clone()
    }

    pub fn global_env(&self) -> &EnvRef {
        &self.global
    }

    pub fn safety(&self) -> &SafetyLimits {
        &self.safety
    }

    pub fn safety_mut(&mut self) -> &mut SafetyLimits {
        &mut self.safety
    }

    pub fn host_mut(&mut self) -> &mut HostContext {
        &mut self.host
    }

    pub fn take_host(&mut self) -> HostContext {
        std::mem::take(&mut self.host)
    }

    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.global.borrow_mut().define(name, value);
    }

    pub fn define_function(&mut self, name: impl Into<String>, params: Vec<String>, body: Vec<Stmt>) {
        self.functions.insert(
            name.into(),
            Rc::new(UserFunction { params, body, closure: self.global.clone() }),
        );
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn variables(&self) -> HashMap<String, Value> {
        self.global.borrow().snapshot()
    }

    pub fn request_stop(&self) {
        self.cancelled.set(true);
    }

    pub fn reset_cancellation(&self) {
        self.cancelled.set(false);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Runs a top-level program, reusing `global` as the outermost scope.
    pub fn run(&mut self, program: &[Stmt]) -> ScriptResult<Value> {
        self.reset_cancellation();
        let env = self.global.clone();
        match self.exec_block(program, &env)? {
            Signal::Return(v) => Ok(v),
            _ => Ok(Value::Null),
        }
    }

    /// Invokes a registered `on <eventName>` handler, as the host would
    /// when delivering an event. No-op if nothing is subscribed.
    pub fn dispatch_event(&mut self, event_name: &str, payload: Value) -> ScriptResult<()> {
        let Some(handler) = self.event_handlers.get(event_name).cloned() else {
            return Ok(());
        };
        let scope = Environment::child(&handler.closure);
        scope.borrow_mut().define("event", payload);
        self.exec_block(&handler.body, &scope).map(|_| ())
    }

    // ---- statement execution ---------------------------------------------

    fn exec_block(&mut self, stmts: &[Stmt], env: &EnvRef) -> ScriptResult<Signal> {
        for stmt in stmts {
            if self.cancelled.get() {
                return Ok(Signal::None);
            }
            self.safety.check_timeout(stmt.position())?;
            match self.exec_stmt(stmt, env)? {
                Signal::None => {}
                other => return Ok(other),
            }
        }
        Ok(Signal::None)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> ScriptResult<Signal> {
        match stmt {
            Stmt::Block(body, _) => self.exec_block(body, &Environment::child(env)),
            Stmt::Set { name, value, .. } => {
                let v = self.eval(value, env)?;
                env.borrow_mut().assign(name, v);
                Ok(Signal::None)
            }
            Stmt::Print { target, .. } => {
                let v = self.eval(target, env)?;
                self.emit_output(v.display_string());
                Ok(Signal::None)
            }
            Stmt::If { condition, then_branch, else_branch, .. } => {
                let cond = self.eval(condition, env)?;
                if cond.is_truthy() {
                    self.exec_block(then_branch, &Environment::child(env))
                } else {
                    self.exec_block(else_branch, &Environment::child(env))
                }
            }
            Stmt::Loop { count, body, pos } => self.exec_loop(count, body, *pos, env),
            Stmt::While { condition, body, pos } => self.exec_while(condition, body, *pos, env),
            Stmt::ForEach { var, iterable, body, pos } => {
                self.exec_foreach(var, iterable, body, *pos, env)
            }
            Stmt::Break(_) => Ok(Signal::Break),
            Stmt::Continue(_) => Ok(Signal::Continue),
            Stmt::Return(expr, _) => {
                let v = match expr {
                    Some(e) => self.eval(e, env)?,
                    None => Value::Null,
                };
                Ok(Signal::Return(v))
            }
            Stmt::FunctionDef { name, params, body, .. } => {
                self.functions.insert(
                    name.clone(),
                    Rc::new(UserFunction { params: params.clone(), body: body.clone(), closure: env.clone() }),
                );
                Ok(Signal::None)
            }
            Stmt::Call { name, args, pos } => {
                let values = self.eval_all(args, env)?;
                self.call_function(name, values, *pos)?;
                Ok(Signal::None)
            }
            Stmt::TryCatch { try_body, err_name, catch_body, .. } => {
                let try_env = Environment::child(env);
                match self.exec_block(try_body, &try_env) {
                    Ok(sig) => Ok(sig),
                    Err(e) => {
                        let catch_env = Environment::child(env);
                        catch_env.borrow_mut().define(err_name.clone(), Value::string(e.message()));
                        self.exec_block(catch_body, &catch_env)
                    }
                }
            }
            Stmt::On { event_name, body, pos } => self.exec_on(event_name, body, *pos, env),
            Stmt::Emit { event_name, payload, .. } => {
                let value = self.eval_named_args(payload, env)?;
                if let Some(bus) = self.host.event_bus.as_mut() {
                    let _ = bus.publish(event_name, value);
                } else {
                    log::debug!("no event bus; 'emit {event_name}' dropped");
                }
                Ok(Signal::None)
            }
            Stmt::Launch { app_id, params, pos } => {
                let id = self.eval(app_id, env)?.display_string();
                let params = self.eval_pairs(params, env)?;
                if let Some(bus) = self.host.command_bus.as_mut() {
                    bus.launch(&id, params).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Close { target, pos } => {
                let target = target.as_ref().map(|e| self.eval(e, env)).transpose()?;
                if let Some(bus) = self.host.command_bus.as_mut() {
                    bus.close(target).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Wait { duration, pos } => {
                let ms = self.eval(duration, env)?.to_number();
                if let Some(bus) = self.host.command_bus.as_mut() {
                    bus.wait(ms).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Focus { target, pos } => self.dispatch_window_action(target, *pos, env, |bus, v| bus.focus(v)),
            Stmt::Minimize { target, pos } => {
                self.dispatch_window_action(target, *pos, env, |bus, v| bus.minimize(v))
            }
            Stmt::Maximize { target, pos } => {
                self.dispatch_window_action(target, *pos, env, |bus, v| bus.maximize(v))
            }
            Stmt::Write { content, path, pos } => {
                let content = self.eval(content, env)?.display_string();
                let path = self.eval(path, env)?.display_string();
                match self.host.filesystem.as_mut() {
                    Some(fs) => fs.write(&path, &content).map_err(|e| RuntimeError::new(e.to_string(), *pos))?,
                    None => {
                        return Err(RuntimeError::new(
                            "No FileSystemManager available for 'write'",
                            *pos,
                        )
                        .into())
                    }
                }
                Ok(Signal::None)
            }
            Stmt::Read { path, var, pos } => {
                let path = self.eval(path, env)?.display_string();
                let content = match self.host.filesystem.as_mut() {
                    Some(fs) => fs.read(&path).map_err(|e| RuntimeError::new(e.to_string(), *pos))?,
                    None => {
                        return Err(RuntimeError::new("No FileSystemManager available for 'read'", *pos).into())
                    }
                };
                env.borrow_mut().assign(var, Value::string(content));
                Ok(Signal::None)
            }
            Stmt::Mkdir { path, pos } => {
                let path = self.eval(path, env)?.display_string();
                if let Some(fs) = self.host.filesystem.as_mut() {
                    fs.mkdir(&path).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Delete { path, pos } => {
                let path = self.eval(path, env)?.display_string();
                if let Some(fs) = self.host.filesystem.as_mut() {
                    fs.delete(&path).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Alert { message, .. } => {
                let text = self.eval(message, env)?.display_string();
                if let Some(app) = self.host.app_registry.as_mut() {
                    let _ = app.alert(&text);
                }
                Ok(Signal::None)
            }
            Stmt::Confirm { message, var, pos } => {
                let text = self.eval(message, env)?.display_string();
                let answer = match self.host.app_registry.as_mut() {
                    Some(app) => app.confirm(&text).map_err(|e| RuntimeError::new(e.to_string(), *pos))?,
                    None => true,
                };
                if let Some(var) = var {
                    env.borrow_mut().assign(var, Value::Bool(answer));
                }
                Ok(Signal::None)
            }
            Stmt::Prompt { message, default, var, pos } => {
                let text = self.eval(message, env)?.display_string();
                let default_text =
                    default.as_ref().map(|e| self.eval(e, env)).transpose()?.map(|v| v.display_string());
                let answer = match self.host.app_registry.as_mut() {
                    Some(app) => app
                        .prompt(&text, default_text.as_deref())
                        .map_err(|e| RuntimeError::new(e.to_string(), *pos))?,
                    None => Some(default_text.unwrap_or_default()),
                };
                if let Some(var) = var {
                    let value = answer.map(Value::String).unwrap_or(Value::Null);
                    env.borrow_mut().assign(var, value);
                }
                Ok(Signal::None)
            }
            Stmt::Notify { message, .. } => {
                let text = self.eval(message, env)?.display_string();
                if let Some(app) = self.host.app_registry.as_mut() {
                    let _ = app.notify(&text);
                }
                Ok(Signal::None)
            }
            Stmt::Play { source, params, pos } => {
                let source = self.eval(source, env)?.display_string();
                let params = self.eval_pairs(params, env)?;
                if let Some(app) = self.host.app_registry.as_mut() {
                    app.play(&source, params).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Stop { source, pos } => {
                let source = source.as_ref().map(|e| self.eval(e, env)).transpose()?.map(|v| v.display_string());
                if let Some(app) = self.host.app_registry.as_mut() {
                    app.stop(source.as_deref()).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Video { source, params, pos } => {
                let source = self.eval(source, env)?.display_string();
                let params = self.eval_pairs(params, env)?;
                if let Some(app) = self.host.app_registry.as_mut() {
                    app.video(&source, params).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                }
                Ok(Signal::None)
            }
            Stmt::Command { name, args, pos } => {
                let values = self.eval_all(args, env)?;
                if let Some(app) = self.host.app_registry.as_mut() {
                    app.run_command(name, values).map_err(|e| RuntimeError::new(e.to_string(), *pos))?;
                } else {
                    log::debug!("no host; command '{name}' ignored");
                }
                Ok(Signal::None)
            }
        }
    }

    fn emit_output(&mut self, text: String) {
        if let Some(bus) = self.host.event_bus.as_mut() {
            let _ = bus.publish("script:output", Value::string(text.clone()));
        }
        self.output.push(text);
    }

    fn dispatch_window_action(
        &mut self,
        target: &Expr,
        pos: Position,
        env: &EnvRef,
        action: impl FnOnce(&mut dyn crate::host::CommandBus, &Value) -> Result<(), crate::host::HostError>,
    ) -> ScriptResult<Signal> {
        let value = self.eval(target, env)?;
        if let Some(bus) = self.host.command_bus.as_mut() {
            action(bus.as_mut(), &value).map_err(|e| RuntimeError::new(e.to_string(), pos))?;
        }
        Ok(Signal::None)
    }

    fn exec_loop(&mut self, count: &Expr, body: &[Stmt], pos: Position, env: &EnvRef) -> ScriptResult<Signal> {
        let count_val = self.eval(count, env)?.to_number();
        let n = self.safety.clamp_loop_iterations(count_val);
        let body_env = Environment::child(env);
        for i in 0..n {
            if self.cancelled.get() {
                return Ok(Signal::None);
            }
            self.safety.check_timeout(pos)?;
            body_env.borrow_mut().define("i", Value::Number(i as f64));
            match self.exec_block(body, &body_env)? {
                Signal::Break => break,
                Signal::Continue => continue,
                Signal::Return(v) => return Ok(Signal::Return(v)),
                Signal::None => {}
            }
        }
        Ok(Signal::None)
    }

    fn exec_while(&mut self, condition: &Expr, body: &[Stmt], pos: Position, env: &EnvRef) -> ScriptResult<Signal> {
        let body_env = Environment::child(env);
        let mut iterations: u64 = 0;
        loop {
            if self.cancelled.get() {
                return Ok(Signal::None);
            }
            self.safety.check_timeout(pos)?;
            if !self.eval(condition, env)?.is_truthy() {
                break;
            }
            iterations += 1;
            if iterations > self.safety.max_loop_iterations {
                return Err(RuntimeError::new(
                    format!("'while' exceeded MAX_LOOP_ITERATIONS ({})", self.safety.max_loop_iterations),
                    pos,
                )
                .into());
            }
            match self.exec_block(body, &body_env)? {
                Signal::Break => break,
                Signal::Continue => continue,
                Signal::Return(v) => return Ok(Signal::Return(v)),
                Signal::None => {}
            }
        }
        Ok(Signal::None)
    }

    fn exec_foreach(
        &mut self,
        var: &str,
        iterable: &Expr,
        body: &[Stmt],
        pos: Position,
        env: &EnvRef,
    ) -> ScriptResult<Signal> {
        let value = self.eval(iterable, env)?;
        let Some(array) = value.as_array() else {
            return Err(RuntimeError::new("'foreach' requires an array", pos).into());
        };
        let snapshot: Vec<Value> = array.borrow().clone();
        let body_env = Environment::child(env);
        for (i, item) in snapshot.into_iter().enumerate() {
            if self.cancelled.get() {
                return Ok(Signal::None);
            }
            self.safety.check_timeout(pos)?;
            body_env.borrow_mut().define(var, item);
            body_env.borrow_mut().define("i", Value::Number(i as f64));
            match self.exec_block(body, &body_env)? {
                Signal::Break => break,
                Signal::Continue => continue,
                Signal::Return(v) => return Ok(Signal::Return(v)),
                Signal::None => {}
            }
        }
        Ok(Signal::None)
    }

    fn exec_on(&mut self, event_name: &str, body: &[Stmt], pos: Position, env: &EnvRef) -> ScriptResult<Signal> {
        let Some(bus) = self.host.event_bus.as_mut() else {
            log::warn!("no event bus; 'on {event_name}' has no effect");
            return Ok(Signal::None);
        };
        if !self.safety.check_event_handler_count(self.event_handlers.len()) {
            log::warn!("MAX_EVENT_HANDLERS reached; ignoring 'on {event_name}'");
            return Ok(Signal::None);
        }
        if self.event_handlers.contains_key(event_name) {
            let _ = bus.unsubscribe(event_name);
        }
        bus.subscribe(event_name).map_err(|e| RuntimeError::new(e.to_string(), pos))?;
        self.event_handlers
            .insert(event_name.to_owned(), EventHandler { body: body.to_vec(), closure: env.clone() });
        Ok(Signal::None)
    }

    // ---- expression evaluation --------------------------------------------

    fn eval_all(&mut self, exprs: &[Expr], env: &EnvRef) -> ScriptResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e, env)).collect()
    }

    fn eval_pairs(&mut self, named: &NamedArgs, env: &EnvRef) -> ScriptResult<Vec<(String, Value)>> {
        named.iter().map(|(k, e)| Ok((k.clone(), self.eval(e, env)?))).collect()
    }

    fn eval_named_args(&mut self, named: &NamedArgs, env: &EnvRef) -> ScriptResult<Value> {
        let entries = self.eval_pairs(named, env)?;
        Ok(Value::object(entries))
    }

    pub fn eval(&mut self, expr: &Expr, env: &EnvRef) -> ScriptResult<Value> {
        match expr {
            Expr::Literal(lit, _) => Ok(literal_value(lit)),
            Expr::Variable(path, _) => Ok(env.borrow().get(path)),
            Expr::Binary { op: BinaryOp::And, lhs, rhs, .. } => {
                let l = self.eval(lhs, env)?;
                if !l.is_truthy() {
                    Ok(l)
                } else {
                    self.eval(rhs, env)
                }
            }
            Expr::Binary { op: BinaryOp::Or, lhs, rhs, .. } => {
                let l = self.eval(lhs, env)?;
                if l.is_truthy() {
                    Ok(l)
                } else {
                    self.eval(rhs, env)
                }
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let l = self.eval(lhs, env)?;
                let r = self.eval(rhs, env)?;
                Ok(eval_binary(*op, &l, &r))
            }
            Expr::Unary { op, expr, .. } => {
                let v = self.eval(expr, env)?;
                Ok(match op {
                    UnaryOp::Neg => Value::Number(-v.to_number()),
                    UnaryOp::Not => Value::Bool(!v.is_truthy()),
                })
            }
            Expr::Call { name, args, pos } => {
                let values = self.eval_all(args, env)?;
                self.call_function(name, values, *pos)
            }
            Expr::Array { items, .. } => {
                let values = self.eval_all(items, env)?;
                Ok(Value::array(self.safety.clamp_array_length(values)))
            }
            Expr::Object { entries, .. } => {
                let mut pairs = self.eval_pairs(entries, env)?;
                if pairs.len() > self.safety.max_object_keys {
                    log::warn!("object literal exceeds MAX_OBJECT_KEYS, truncating");
                    pairs.truncate(self.safety.max_object_keys);
                }
                Ok(Value::object(pairs))
            }
            Expr::Member { target, name, .. } => {
                let t = self.eval(target, env)?;
                Ok(crate::value::get_member(&t, name))
            }
            Expr::Index { target, index, .. } => {
                let t = self.eval(target, env)?;
                let idx = self.eval(index, env)?;
                Ok(crate::value::get_index(&t, &idx))
            }
            Expr::Grouping { inner, .. } => self.eval(inner, env),
            Expr::InterpolatedString { parts, .. } => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        InterpPart::Text(text) => out.push_str(text),
                        InterpPart::Expr(e) => out.push_str(&self.eval(e, env)?.display_string()),
                    }
                }
                Ok(Value::string(self.safety.clamp_string_length(out)))
            }
        }
    }

    /// `call name args…`: built-in first, then user function, else
    /// `ScriptReferenceError` (spec §4.3).
    pub fn call_function(&mut self, name: &str, args: Vec<Value>, pos: Position) -> ScriptResult<Value> {
        if let Some(builtin) = self.builtins.get(name) {
            return builtin(self, &args, pos).map_err(|e| match e {
                ScriptError::Runtime(re) => RuntimeError::in_builtin(name, re.message, pos).into(),
                other => other,
            });
        }

        let Some(func) = self.functions.get(name).cloned() else {
            return Err(ScriptReferenceError::not_defined(name, pos).into());
        };

        self.safety.check_recursion_depth(self.call_stack.len() + 1, name, pos)?;
        self.call_stack.push(name.to_owned());

        let frame = Environment::child(&func.closure);
        for (i, param) in func.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or(Value::Null);
            frame.borrow_mut().define(param.clone(), value);
        }

        let result = self.exec_block(&func.body, &frame);
        self.call_stack.pop();

        match result {
            Ok(Signal::Return(v)) => Ok(v),
            Ok(_) => Ok(Value::Null),
            Err(ScriptError::Runtime(re)) if re.call_stack.is_empty() => {
                Err(re.with_call_stack(self.call_stack.clone()).into())
            }
            Err(e) => Err(e),
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
                Value::String(format!("{}{}", lhs.display_string(), rhs.display_string()))
            } else {
                Value::Number(lhs.to_number() + rhs.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => {
            let r = rhs.to_number();
            Value::Number(if r == 0.0 { 0.0 } else { lhs.to_number() / r })
        }
        BinaryOp::Mod => {
            let r = rhs.to_number();
            Value::Number(if r == 0.0 { 0.0 } else { lhs.to_number() % r })
        }
        BinaryOp::Eq => Value::Bool(lhs.strict_eq(rhs)),
        BinaryOp::NotEq => Value::Bool(!lhs.strict_eq(rhs)),
        BinaryOp::Lt => Value::Bool(compare(lhs, rhs) == std::cmp::Ordering::Less),
        BinaryOp::Gt => Value::Bool(compare(lhs, rhs) == std::cmp::Ordering::Greater),
        BinaryOp::LtEq => Value::Bool(compare(lhs, rhs) != std::cmp::Ordering::Greater),
        BinaryOp::GtEq => Value::Bool(compare(lhs, rhs) != std::cmp::Ordering::Less),
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuited before reaching eval_binary"),
    }
}

fn compare(lhs: &Value, rhs: &Value) -> std::cmp::Ordering {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()).unwrap_or(std::cmp::Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run(src: &str) -> (Vec<String>, Interpreter) {
        let program = Parser::parse_source(src).unwrap();
        let mut interp = Interpreter::new(HostContext::new(), SafetyLimits::default());
        interp.run(&program).unwrap();
        let output = interp.take_output();
        (output, interp)
    }

    #[test]
    fn arithmetic_precedence_and_print() {
        let (out, _) = run("set $x = 2 + 3 * 4\nprint $x");
        assert_eq!(out, vec!["14"]);
    }

    #[test]
    fn string_concatenation_with_plus() {
        let (out, _) = run(r#"set $s = "ab"
print $s + "c""#);
        assert_eq!(out, vec!["abc"]);
    }

    #[test]
    fn loop_exposes_zero_based_index() {
        let (out, _) = run("loop 3 { print $i }");
        assert_eq!(out, vec!["0", "1", "2"]);
    }

    #[test]
    fn recursive_function_call() {
        let src = r#"def fib($n) {
    if $n < 2 then { return $n }
    set $a = $n - 1
    set $b = $n - 2
    set $ra = call fib $a
    set $rb = call fib $b
    return $ra + $rb
}
print call fib 10"#;
        let (out, _) = run(src);
        assert_eq!(out, vec!["55"]);
    }

    #[test]
    fn try_catch_recovers_from_undefined_function() {
        let (out, _) = run(r#"try { set $x = call nope } catch $e { print "caught" }"#);
        assert_eq!(out, vec!["caught"]);
    }

    #[test]
    fn division_and_modulo_by_zero_yield_zero() {
        let (out, _) = run("set $a = 5 / 0\nset $b = 5 % 0\nprint $a\nprint $b");
        assert_eq!(out, vec!["0", "0"]);
    }

    #[test]
    fn short_circuit_or_returns_selected_operand() {
        let (out, _) = run(r#"set $a = 0 || "fallback"
print $a"#);
        assert_eq!(out, vec!["fallback"]);
    }

    #[test]
    fn break_and_continue_stay_within_nearest_loop() {
        let (out, _) = run("loop 5 { if $i == 2 then { break } print $i }");
        assert_eq!(out, vec!["0", "1"]);
    }

    #[test]
    fn closures_capture_defining_environment() {
        let src = r#"set $base = 10
def addBase($n) { return $n + $base }
print call addBase 5"#;
        let (out, _) = run(src);
        assert_eq!(out, vec!["15"]);
    }

    #[test]
    fn undefined_function_raises_reference_error() {
        let program = Parser::parse_source("call mystery").unwrap();
        let mut interp = Interpreter::new(HostContext::new(), SafetyLimits::default());
        let err = interp.run(&program).unwrap_err();
        assert!(matches!(err, ScriptError::Reference(_)));
    }

    #[test]
    fn deep_recursion_raises_recursion_error() {
        let src = "def loopy($n) { return call loopy $n }\ncall loopy 1";
        let program = Parser::parse_source(src).unwrap();
        let mut interp = Interpreter::new(HostContext::new(), SafetyLimits::default());
        let err = interp.run(&program).unwrap_err();
        assert!(matches!(err, ScriptError::Recursion(_)));
    }
}
