//! Host integration surface (spec §6).
//!
//! The teacher wires a single untyped host singleton into its compiler
//! backend; that doesn't fit a library that must run fine with no host at
//! all. Instead each capability is its own object-safe trait, and
//! [`HostContext`] holds each as an optional `Box<dyn Trait>` so a missing
//! capability degrades to a `HostError` rather than `ScriptEngine` needing
//! to know which embedder it's running inside.

use std::fmt;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct HostError(pub String);

impl HostError {
    pub fn unavailable(capability: &str) -> Self {
        HostError(format!("{capability} is not available in this host"))
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for HostError {}

pub type HostResult<T> = Result<T, HostError>;

/// Subscribes scripts to desktop-wide events and re-emits script `emit`
/// statements onto the same bus.
pub trait EventBus {
    fn subscribe(&mut self, event_name: &str) -> HostResult<()>;
    fn unsubscribe(&mut self, event_name: &str) -> HostResult<()>;
    fn publish(&mut self, event_name: &str, payload: Value) -> HostResult<()>;
}

/// Runs desktop commands (`launch`, `close`, `focus`, `minimize`,
/// `maximize`, `wait`) against the window manager / app host.
pub trait CommandBus {
    fn launch(&mut self, app_id: &str, params: Vec<(String, Value)>) -> HostResult<Value>;
    fn close(&mut self, target: Option<Value>) -> HostResult<()>;
    fn focus(&mut self, target: &Value) -> HostResult<()>;
    fn minimize(&mut self, target: &Value) -> HostResult<()>;
    fn maximize(&mut self, target: &Value) -> HostResult<()>;
    fn wait(&mut self, duration_ms: f64) -> HostResult<()>;
}

/// Backs `read`/`write`/`mkdir`/`delete` against the desktop's virtual
/// filesystem.
pub trait FileSystemManager {
    fn read(&mut self, path: &str) -> HostResult<String>;
    fn write(&mut self, path: &str, content: &str) -> HostResult<()>;
    fn mkdir(&mut self, path: &str) -> HostResult<()>;
    fn delete(&mut self, path: &str) -> HostResult<()>;
    fn exists(&mut self, path: &str) -> HostResult<bool>;
}

/// App lookup/launch (spec §6: `get(id), launch(id, params), getAll()`),
/// plus dialogs, notifications, and media/terminal commands that don't fit
/// cleanly under `CommandBus`.
pub trait AppRegistry {
    fn get(&mut self, id: &str) -> HostResult<Option<Value>>;
    fn get_all(&mut self) -> HostResult<Vec<Value>>;
    fn launch(&mut self, id: &str, params: Vec<(String, Value)>) -> HostResult<Value>;

    fn alert(&mut self, message: &str) -> HostResult<()>;
    fn confirm(&mut self, message: &str) -> HostResult<bool>;
    fn prompt(&mut self, message: &str, default: Option<&str>) -> HostResult<Option<String>>;
    fn notify(&mut self, message: &str) -> HostResult<()>;
    fn play(&mut self, source: &str, params: Vec<(String, Value)>) -> HostResult<()>;
    fn stop(&mut self, source: Option<&str>) -> HostResult<()>;
    fn video(&mut self, source: &str, params: Vec<(String, Value)>) -> HostResult<()>;
    /// Fallback sink for an unrecognized leading-identifier command.
    fn run_command(&mut self, name: &str, args: Vec<Value>) -> HostResult<Value>;
}

/// Capabilities an embedder wires in before calling
/// [`crate::engine::ScriptEngine::initialize`]. Any field left `None`
/// makes the corresponding statements fail with a `HostError`-backed
/// `RuntimeError` instead of panicking, per spec §6's "degrades
/// gracefully when absent".
#[derive(Default)]
pub struct HostContext {
    pub event_bus: Option<Box<dyn EventBus>>,
    pub command_bus: Option<Box<dyn CommandBus>>,
    pub filesystem: Option<Box<dyn FileSystemManager>>,
    pub app_registry: Option<Box<dyn AppRegistry>>,
}

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }
}

pub mod memory {
    //! Reference in-process implementations used by the CLI and tests.

    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryEventBus {
        pub subscriptions: Vec<String>,
        pub published: Vec<(String, Value)>,
    }

    impl EventBus for InMemoryEventBus {
        fn subscribe(&mut self, event_name: &str) -> HostResult<()> {
            self.subscriptions.push(event_name.to_owned());
            Ok(())
        }

        fn unsubscribe(&mut self, event_name: &str) -> HostResult<()> {
            self.subscriptions.retain(|e| e != event_name);
            Ok(())
        }

        fn publish(&mut self, event_name: &str, payload: Value) -> HostResult<()> {
            self.published.push((event_name.to_owned(), payload));
            Ok(())
        }
    }

    /// Records every command invocation without doing anything; useful for
    /// tests asserting which actions a script took.
    #[derive(Default)]
    pub struct NullCommandBus {
        pub calls: Vec<String>,
    }

    impl CommandBus for NullCommandBus {
        fn launch(&mut self, app_id: &str, _params: Vec<(String, Value)>) -> HostResult<Value> {
            self.calls.push(format!("launch {app_id}"));
            Ok(Value::string(app_id))
        }

        fn close(&mut self, target: Option<Value>) -> HostResult<()> {
            self.calls.push(format!("close {target:?}"));
            Ok(())
        }

        fn focus(&mut self, target: &Value) -> HostResult<()> {
            self.calls.push(format!("focus {target:?}"));
            Ok(())
        }

        fn minimize(&mut self, target: &Value) -> HostResult<()> {
            self.calls.push(format!("minimize {target:?}"));
            Ok(())
        }

        fn maximize(&mut self, target: &Value) -> HostResult<()> {
            self.calls.push(format!("maximize {target:?}"));
            Ok(())
        }

        fn wait(&mut self, duration_ms: f64) -> HostResult<()> {
            self.calls.push(format!("wait {duration_ms}"));
            Ok(())
        }
    }

    /// An in-memory virtual filesystem, mainly for the autoexec discovery
    /// path and integration tests.
    #[derive(Default)]
    pub struct InMemoryFileSystem {
        pub files: HashMap<String, String>,
    }

    impl FileSystemManager for InMemoryFileSystem {
        fn read(&mut self, path: &str) -> HostResult<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| HostError(format!("No such file: {path}")))
        }

        fn write(&mut self, path: &str, content: &str) -> HostResult<()> {
            self.files.insert(path.to_owned(), content.to_owned());
            Ok(())
        }

        fn mkdir(&mut self, path: &str) -> HostResult<()> {
            self.files.entry(format!("{path}/.keep")).or_default();
            Ok(())
        }

        fn delete(&mut self, path: &str) -> HostResult<()> {
            self.files.remove(path);
            Ok(())
        }

        fn exists(&mut self, path: &str) -> HostResult<bool> {
            Ok(self.files.contains_key(path))
        }
    }

    /// Headless dialog/media backend: `confirm` always answers `true`,
    /// `prompt` always returns the supplied default (or `None`).
    #[derive(Default)]
    pub struct HeadlessAppRegistry {
        pub alerts: Vec<String>,
        pub notifications: Vec<String>,
    }

    impl AppRegistry for HeadlessAppRegistry {
        fn get(&mut self, _id: &str) -> HostResult<Option<Value>> {
            Ok(None)
        }

        fn get_all(&mut self) -> HostResult<Vec<Value>> {
            Ok(Vec::new())
        }

        fn launch(&mut self, id: &str, _params: Vec<(String, Value)>) -> HostResult<Value> {
            Ok(Value::string(id))
        }

        fn alert(&mut self, message: &str) -> HostResult<()> {
            self.alerts.push(message.to_owned());
            Ok(())
        }

        fn confirm(&mut self, _message: &str) -> HostResult<bool> {
            Ok(true)
        }

        fn prompt(&mut self, _message: &str, default: Option<&str>) -> HostResult<Option<String>> {
            Ok(default.map(|s| s.to_owned()))
        }

        fn notify(&mut self, message: &str) -> HostResult<()> {
            self.notifications.push(message.to_owned());
            Ok(())
        }

        fn play(&mut self, _source: &str, _params: Vec<(String, Value)>) -> HostResult<()> {
            Ok(())
        }

        fn stop(&mut self, _source: Option<&str>) -> HostResult<()> {
            Ok(())
        }

        fn video(&mut self, _source: &str, _params: Vec<(String, Value)>) -> HostResult<()> {
            Ok(())
        }

        fn run_command(&mut self, name: &str, _args: Vec<Value>) -> HostResult<Value> {
            Err(HostError(format!("Unknown command '{name}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::*;
    use super::*;

    #[test]
    fn in_memory_event_bus_records_publications() {
        let mut bus = InMemoryEventBus::default();
        bus.subscribe("window:open").unwrap();
        bus.publish("window:open", Value::Null).unwrap();
        assert_eq!(bus.published.len(), 1);
    }

    #[test]
    fn host_context_defaults_to_no_capabilities() {
        let ctx = HostContext::new();
        assert!(ctx.event_bus.is_none());
        assert!(ctx.command_bus.is_none());
    }
}
