//! Execution safety limits (spec §4.4).
//!
//! `SafetyLimits` doubles as the engine's configuration object: an
//! embedder builds one with [`SafetyLimits::default`] and can override any
//! field before calling [`crate::engine::ScriptEngine::initialize`].

use std::time::Instant;

use crate::error::TimeoutError;
use crate::position::Position;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    pub max_recursion_depth: usize,
    pub max_loop_iterations: u64,
    pub max_string_length: usize,
    pub max_array_length: usize,
    pub max_object_keys: usize,
    pub max_event_handlers: usize,
    pub default_execution_timeout_ms: u64,
    pub autoexec_timeout_ms: u64,
    pub max_call_stack_size: usize,

    /// Timeout in effect for the run currently executing; `0` disables
    /// the timeout check entirely. Not part of the on-disk config shape.
    #[serde(skip)]
    current_timeout_ms: u64,
    #[serde(skip)]
    start: Option<Instant>,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: 1000,
            max_loop_iterations: 100_000,
            max_string_length: 1_000_000,
            max_array_length: 100_000,
            max_object_keys: 10_000,
            max_event_handlers: 1_000,
            default_execution_timeout_ms: 30_000,
            autoexec_timeout_ms: 10_000,
            max_call_stack_size: 100,
            current_timeout_ms: 30_000,
            start: None,
        }
    }
}

impl SafetyLimits {
    pub fn start_execution(&mut self, timeout_override_ms: Option<u64>) {
        self.current_timeout_ms = timeout_override_ms.unwrap_or(self.default_execution_timeout_ms);
        self.start = Some(Instant::now());
    }

    pub fn stop_execution(&mut self) {
        self.start = None;
    }

    pub fn check_timeout(&self, position: Position) -> Result<(), TimeoutError> {
        if self.current_timeout_ms == 0 {
            return Ok(());
        }
        if let Some(start) = self.start {
            let elapsed = start.elapsed().as_millis() as u64;
            if elapsed > self.current_timeout_ms {
                return Err(TimeoutError {
                    message: format!("Script execution exceeded {} ms", self.current_timeout_ms),
                    position,
                    timeout_ms: self.current_timeout_ms,
                });
            }
        }
        Ok(())
    }

    /// Truncates `count` into `[0, max_loop_iterations]`, logging when it
    /// had to clamp.
    pub fn clamp_loop_iterations(&self, count: f64) -> u64 {
        let count = if count.is_finite() && count > 0.0 {
            count.floor() as u64
        } else {
            0
        };
        if count > self.max_loop_iterations {
            log::warn!(
                "loop iteration count {count} exceeds MAX_LOOP_ITERATIONS ({}), clamping",
                self.max_loop_iterations
            );
            self.max_loop_iterations
        } else {
            count
        }
    }

    pub fn clamp_string_length(&self, s: String) -> String {
        if s.chars().count() > self.max_string_length {
            log::warn!("string length exceeds MAX_STRING_LENGTH, truncating");
            s.chars().take(self.max_string_length).collect()
        } else {
            s
        }
    }

    pub fn clamp_array_length(&self, mut items: Vec<crate::value::Value>) -> Vec<crate::value::Value> {
        if items.len() > self.max_array_length {
            log::warn!("array length exceeds MAX_ARRAY_LENGTH, truncating");
            items.truncate(self.max_array_length);
        }
        items
    }

    pub fn check_recursion_depth(
        &self,
        depth: usize,
        function_name: &str,
        position: Position,
    ) -> Result<(), crate::error::RecursionError> {
        if depth > self.max_recursion_depth {
            Err(crate::error::RecursionError {
                message: format!(
                    "Maximum recursion depth ({}) exceeded in function '{function_name}'",
                    self.max_recursion_depth
                ),
                position,
                max_depth: self.max_recursion_depth,
                function_name: function_name.to_owned(),
            })
        } else {
            Ok(())
        }
    }

    pub fn check_event_handler_count(&self, count: usize) -> bool {
        count < self.max_event_handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_negative_and_fractional_loop_counts_to_floor() {
        let limits = SafetyLimits::default();
        assert_eq!(limits.clamp_loop_iterations(-5.0), 0);
        assert_eq!(limits.clamp_loop_iterations(3.9), 3);
    }

    #[test]
    fn clamps_loop_count_above_cap() {
        let mut limits = SafetyLimits::default();
        limits.max_loop_iterations = 10;
        assert_eq!(limits.clamp_loop_iterations(1_000.0), 10);
    }

    #[test]
    fn zero_timeout_disables_check() {
        let mut limits = SafetyLimits::default();
        limits.current_timeout_ms = 0;
        limits.start_execution(Some(0));
        assert!(limits.check_timeout(Position::start()).is_ok());
    }
}
