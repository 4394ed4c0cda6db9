//! `ScriptEngine`: the embedder-facing surface (spec §6). Wires lexing,
//! parsing, and interpretation behind `initialize`/`run`/`stop`/`reset`,
//! rejecting reentrant `run` calls and emitting `script:*` events on the
//! host's event bus when one is wired in.

use std::collections::HashMap;

use crate::error::{ParseError, ScriptError, ScriptResult};
use crate::host::HostContext;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::safety::SafetyLimits;
use crate::value::Value;

/// Per-run overrides; anything left `None` falls back to the engine's
/// defaults set at [`ScriptEngine::initialize`] time.
#[derive(Default)]
pub struct RunOptions {
    pub timeout_ms: Option<u64>,
    pub variables: Vec<(String, Value)>,
}

pub struct RunOutcome {
    pub success: bool,
    pub output: Vec<String>,
    pub error: Option<ScriptError>,
    pub result: Value,
}

pub struct ParseOutcome {
    pub success: bool,
    pub ast: Option<Vec<crate::ast::Stmt>>,
    pub error: Option<ParseError>,
}

type OutputCallback = Box<dyn FnMut(&str)>;
type ErrorCallback = Box<dyn FnMut(&ScriptError)>;
type CompleteCallback = Box<dyn FnMut(bool)>;

pub struct ScriptEngine {
    interpreter: Interpreter,
    running: bool,
    on_output: Option<OutputCallback>,
    on_error: Option<ErrorCallback>,
    on_complete: Option<CompleteCallback>,
}

impl ScriptEngine {
    /// Wires the four optional host capabilities in. Absence of any is
    /// tolerated; dependent statements degrade per spec §6.
    pub fn initialize(context: HostContext, safety: SafetyLimits) -> Self {
        Self {
            interpreter: Interpreter::new(context, safety),
            running: false,
            on_output: None,
            on_error: None,
            on_complete: None,
        }
    }

    pub fn on_output(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_output = Some(Box::new(callback));
    }

    pub fn on_error(&mut self, callback: impl FnMut(&ScriptError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    pub fn on_complete(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn define_function(&mut self, name: &str, params: Vec<String>, body: Vec<crate::ast::Stmt>) {
        self.interpreter.define_function(name, params, body);
    }

    pub fn get_variables(&self) -> HashMap<String, Value> {
        self.interpreter.variables()
    }

    pub fn parse(&self, source: &str) -> ParseOutcome {
        match Parser::parse_source(source) {
            Ok(ast) => ParseOutcome { success: true, ast: Some(ast), error: None },
            Err(e) => ParseOutcome { success: false, ast: None, error: Some(e) },
        }
    }

    /// Rejects reentry with a `RuntimeError` carrying "Script already
    /// running", per spec §5 ("`run` rejects reentry").
    pub fn run(&mut self, source: &str, options: RunOptions) -> ScriptResult<RunOutcome> {
        if self.running {
            return Err(crate::error::RuntimeError::new("Script already running", crate::position::Position::start()).into());
        }
        self.running = true;
        self.interpreter.reset_cancellation();

        for (name, value) in options.variables {
            self.interpreter.define_global(&name, value);
        }

        self.emit_lifecycle_event("script:start", Value::Null);
        self.interpreter.safety_mut().start_execution(options.timeout_ms);

        let program = Parser::parse_source(source).map_err(ScriptError::from);
        let outcome = match program {
            Ok(ast) => match self.interpreter.run(&ast) {
                Ok(result) => RunOutcome { success: true, output: self.interpreter.take_output(), error: None, result },
                Err(e) => RunOutcome { success: false, output: self.interpreter.take_output(), error: Some(e), result: Value::Null },
            },
            Err(e) => RunOutcome { success: false, output: Vec::new(), error: Some(e), result: Value::Null },
        };

        self.interpreter.safety_mut().stop_execution();
        self.running = false;

        // `script:output` is published per line by the interpreter itself
        // (as each `print` executes); only the callback needs driving here.
        for line in &outcome.output {
            if let Some(cb) = self.on_output.as_mut() {
                cb(line);
            }
        }
        if let Some(err) = &outcome.error {
            if let Some(cb) = self.on_error.as_mut() {
                cb(err);
            }
            self.emit_lifecycle_event("script:error", Value::string(err.to_string()));
        }
        if let Some(cb) = self.on_complete.as_mut() {
            cb(outcome.success);
        }
        self.emit_lifecycle_event("script:complete", Value::Bool(outcome.success));

        Ok(outcome)
    }

    /// Reads `path` via the wired `FileSystemManager` and runs it; fails if
    /// no filesystem is configured.
    pub fn run_file(&mut self, path: &str, options: RunOptions) -> ScriptResult<RunOutcome> {
        let source = match self.interpreter.host_mut().filesystem.as_mut() {
            Some(fs) => fs.read(path).map_err(|e| {
                crate::error::RuntimeError::new(format!("Could not read '{path}': {e}"), crate::position::Position::start())
            })?,
            None => {
                return Err(crate::error::RuntimeError::new(
                    "No FileSystemManager available to read script file",
                    crate::position::Position::start(),
                )
                .into())
            }
        };
        self.run(&source, options)
    }

    pub fn stop(&mut self) {
        self.interpreter.request_stop();
    }

    /// Drops the global environment, user functions, and event handlers,
    /// giving the embedder a clean engine without re-wiring capabilities.
    pub fn reset(&mut self) {
        let host = self.interpreter.take_host();
        let safety = self.interpreter.safety().clone();
        self.interpreter = Interpreter::new(host, safety);
        self.running = false;
    }

    /// Publishes an event on the host bus if one is wired in; used by
    /// [`crate::autoexec`] for `autoexec:{start,complete,error}`.
    pub(crate) fn emit_lifecycle_event(&mut self, name: &str, payload: Value) {
        if let Some(bus) = self.interpreter.host_mut().event_bus.as_mut() {
            let _ = bus.publish(name, payload);
        }
    }

    pub(crate) fn filesystem_mut(&mut self) -> Option<&mut Box<dyn crate::host::FileSystemManager>> {
        self.interpreter.host_mut().filesystem.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::InMemoryEventBus;

    fn engine() -> ScriptEngine {
        ScriptEngine::initialize(HostContext::new(), SafetyLimits::default())
    }

    #[test]
    fn run_executes_and_reports_success() {
        let mut e = engine();
        let outcome = e.run("set $x = 1 + 2\nprint $x", RunOptions::default()).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.output, vec!["3".to_owned()]);
    }

    #[test]
    fn run_surfaces_parse_errors_without_executing() {
        let mut e = engine();
        let outcome = e.run("set $x =", RunOptions::default()).unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn run_emits_lifecycle_events_when_bus_present() {
        let mut host = HostContext::new();
        host.event_bus = Some(Box::new(InMemoryEventBus::default()));
        let mut e = ScriptEngine::initialize(host, SafetyLimits::default());
        e.run("print hello", RunOptions::default()).unwrap();
        // can't downcast the trait object back to InMemoryEventBus here;
        // absence of a panic plus `script:start`/`script:complete` firing
        // without a capability error is the behavior under test.
    }

    #[test]
    fn define_function_is_visible_to_call_statements() {
        let mut e = engine();
        let pos = crate::position::Position::start();
        e.define_function(
            "greet",
            vec![],
            vec![crate::ast::Stmt::Print { target: crate::ast::Expr::Literal(crate::ast::Literal::String("hi".into()), pos), pos }],
        );
        let outcome = e.run("call greet", RunOptions::default()).unwrap();
        assert_eq!(outcome.output, vec!["hi".to_owned()]);
    }
}
