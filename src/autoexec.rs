//! Startup script discovery (spec §4.7/§6).
//!
//! Probes a real host path first (`./autoexec.retro`, read directly off
//! disk — this is the one place the runtime touches the real filesystem
//! rather than the virtual one), then three conventional virtual-FS
//! locations in order. The first script found runs with
//! `AUTOEXEC_TIMEOUT`, `AUTOEXEC=true`, and `BOOT_TIME=<now>` pre-bound.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::{RunOptions, RunOutcome, ScriptEngine};
use crate::error::ScriptResult;
use crate::value::Value;

pub const REAL_HOST_PATH: &str = "./autoexec.retro";

/// Virtual-filesystem fallback locations, probed in order after the real
/// host path comes up empty.
pub const VIRTUAL_FS_CANDIDATES: [&str; 3] =
    ["/system/autoexec.retro", "/home/autoexec.retro", "/autoexec.retro"];

fn boot_time_millis() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as f64).unwrap_or(0.0)
}

/// Finds and runs the first available autoexec script, or does nothing if
/// none is found. Emits `autoexec:{start,complete,error}` through the
/// engine's event bus when one is present.
pub fn run_autoexec(engine: &mut ScriptEngine, autoexec_timeout_ms: u64) -> ScriptResult<Option<RunOutcome>> {
    let Some(source) = discover(engine) else {
        return Ok(None);
    };

    engine.emit_lifecycle_event("autoexec:start", Value::Null);

    let options = RunOptions {
        timeout_ms: Some(autoexec_timeout_ms),
        variables: vec![("AUTOEXEC".to_owned(), Value::Bool(true)), ("BOOT_TIME".to_owned(), Value::Number(boot_time_millis()))],
    };

    let outcome = engine.run(&source, options)?;
    if outcome.success {
        engine.emit_lifecycle_event("autoexec:complete", Value::Bool(true));
    } else {
        let message = outcome.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
        engine.emit_lifecycle_event("autoexec:error", Value::string(message));
    }
    Ok(Some(outcome))
}

fn discover(engine: &mut ScriptEngine) -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(REAL_HOST_PATH) {
        return Some(content);
    }
    for candidate in VIRTUAL_FS_CANDIDATES {
        if let Some(fs) = engine.filesystem_mut() {
            if let Ok(content) = fs.read(candidate) {
                return Some(content);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{InMemoryEventBus, InMemoryFileSystem};
    use crate::host::HostContext;
    use crate::safety::SafetyLimits;

    #[test]
    fn falls_back_to_virtual_fs_when_no_real_file_exists() {
        let mut fs = InMemoryFileSystem::default();
        fs.files.insert("/system/autoexec.retro".to_owned(), "print \"booted\"".to_owned());
        let mut host = HostContext::new();
        host.filesystem = Some(Box::new(fs));
        host.event_bus = Some(Box::new(InMemoryEventBus::default()));
        let mut engine = ScriptEngine::initialize(host, SafetyLimits::default());

        let outcome = run_autoexec(&mut engine, 5_000).unwrap().expect("autoexec should have run");
        assert!(outcome.success);
        assert_eq!(outcome.output, vec!["booted".to_owned()]);
    }

    #[test]
    fn returns_none_when_nothing_is_found() {
        let mut engine = ScriptEngine::initialize(HostContext::new(), SafetyLimits::default());
        assert!(run_autoexec(&mut engine, 5_000).unwrap().is_none());
    }
}
