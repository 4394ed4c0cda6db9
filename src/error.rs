//! Error taxonomy for RS scripts.
//!
//! All script errors share the shape described in the spec: a kind, a
//! message, a source position, and an optional hint. They are plain enums
//! with hand-written `Display`/`Error` impls, in the teacher's style
//! (`src/loader/loaderror.rs`, `src/ast/parse_error.rs`) rather than a
//! derive-macro error crate.

use std::fmt::{self, Display};

use crate::position::Position;

/// A single script error, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptError {
    Parse(ParseError),
    Runtime(RuntimeError),
    Timeout(TimeoutError),
    Recursion(RecursionError),
    Type(ScriptTypeError),
    Reference(ScriptReferenceError),
}

impl ScriptError {
    pub fn position(&self) -> Position {
        match self {
            ScriptError::Parse(e) => e.position,
            ScriptError::Runtime(e) => e.position,
            ScriptError::Timeout(e) => e.position,
            ScriptError::Recursion(e) => e.position,
            ScriptError::Type(e) => e.position,
            ScriptError::Reference(e) => e.position,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScriptError::Parse(_) => "ParseError",
            ScriptError::Runtime(_) => "RuntimeError",
            ScriptError::Timeout(_) => "TimeoutError",
            ScriptError::Recursion(_) => "RecursionError",
            ScriptError::Type(_) => "ScriptTypeError",
            ScriptError::Reference(_) => "ScriptReferenceError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ScriptError::Parse(e) => &e.message,
            ScriptError::Runtime(e) => &e.message,
            ScriptError::Timeout(e) => &e.message,
            ScriptError::Recursion(e) => &e.message,
            ScriptError::Type(e) => &e.message,
            ScriptError::Reference(e) => &e.message,
        }
    }

    /// Render the error with a `^` pointer under the offending column and,
    /// when `contextLines` source lines are available around it, a small
    /// source window. Mirrors `ScriptEngine::toStringWithContext`.
    pub fn to_string_with_context(&self, source: &str, context_lines: usize) -> String {
        let pos = self.position();
        let lines: Vec<&str> = source.lines().collect();
        let mut out = format!("{}: {}", self.name(), self.message());

        if pos.line >= 1 && pos.line <= lines.len() {
            out.push('\n');
            let start = pos.line.saturating_sub(context_lines + 1);
            let end = (pos.line + context_lines).min(lines.len());
            for (idx, line) in lines.iter().enumerate().take(end).skip(start) {
                let lineno = idx + 1;
                out.push_str(&format!("{lineno:>5} | {line}\n"));
                if lineno == pos.line {
                    let marker_col = pos.column.saturating_sub(1);
                    out.push_str(&format!(
                        "      | {}^\n",
                        " ".repeat(marker_col)
                    ));
                }
            }
        }

        if let Some(hint) = self.hint() {
            out.push_str(&format!("hint: {hint}\n"));
        }
        out
    }

    fn hint(&self) -> Option<&str> {
        match self {
            ScriptError::Parse(e) => e.hint.as_deref(),
            ScriptError::Reference(e) => Some("Check spelling or define it with 'def ...'"),
            _ => None,
        }
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.name(), self.position(), self.message())
    }
}

impl std::error::Error for ScriptError {}

macro_rules! from_variant {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for ScriptError {
            fn from(e: $ty) -> Self {
                ScriptError::$variant(e)
            }
        }
    };
}

from_variant!(Parse, ParseError);
from_variant!(Runtime, RuntimeError);
from_variant!(Timeout, TimeoutError);
from_variant!(Recursion, RecursionError);
from_variant!(Type, ScriptTypeError);
from_variant!(Reference, ScriptReferenceError);

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub message: String,
    pub position: Position,
    /// Names of user functions active at the point of failure, innermost
    /// last, rendered underneath the base message.
    pub call_stack: Vec<String>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            call_stack: Vec::new(),
        }
    }

    pub fn with_call_stack(mut self, call_stack: Vec<String>) -> Self {
        self.call_stack = call_stack;
        self
    }

    /// Wraps an arbitrary built-in failure the way the interpreter does
    /// when invoking built-ins: `"Error in function '<name>': <msg>"`.
    pub fn in_builtin(name: &str, message: impl Into<String>, position: Position) -> Self {
        Self::new(format!("Error in function '{name}': {}", message.into()), position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutError {
    pub message: String,
    pub position: Position,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecursionError {
    pub message: String,
    pub position: Position,
    pub max_depth: usize,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptTypeError {
    pub message: String,
    pub position: Position,
    pub expected: String,
    pub received: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptReferenceError {
    pub message: String,
    pub position: Position,
    pub identifier: String,
}

impl ScriptReferenceError {
    pub fn not_defined(identifier: &str, position: Position) -> Self {
        Self {
            message: format!("'{identifier}' is not defined"),
            position,
            identifier: identifier.to_owned(),
        }
    }
}

pub type ScriptResult<T> = Result<T, ScriptError>;
