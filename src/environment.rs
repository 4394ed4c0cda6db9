//! Lexical scope chain.
//!
//! Generalizes the teacher's flat `Vec<HashMap<String, VariableType>>`
//! scope stack into a parent-linked chain so a `FunctionDef` can capture
//! its defining environment and support real closures (spec §3).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{ScriptReferenceError, ScriptResult};
use crate::position::Position;
use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub struct Environment {
    vars: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment { vars: HashMap::new(), parent: None }))
    }

    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment { vars: HashMap::new(), parent: Some(parent.clone()) }))
    }

    /// Defines or overwrites `name` in the *current* scope, regardless of
    /// whether an outer scope already defines it. Used for function
    /// parameters and `foreach` loop variables.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Resolves `$name` (or `$name.field.field`) by looking up the root
    /// segment through the scope chain, then walking field accesses on
    /// objects/arrays. Missing root variables resolve to `Value::Null`
    /// per spec §4.3's "undefined variables read as null".
    pub fn get(&self, path: &str) -> Value {
        let mut parts = path.split('.');
        let root = parts.next().unwrap_or(path);
        let mut value = self.get_root(root).unwrap_or(Value::Null);
        for field in parts {
            value = crate::value::get_member(&value, field);
        }
        value
    }

    fn get_root(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.vars.get(name) {
            Some(v.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get_root(name)
        } else {
            None
        }
    }

    /// Assigns to the nearest scope in the chain that already owns
    /// `name`; if no scope owns it, defines it in the current (innermost)
    /// scope, matching "assignment to an undeclared name creates it in
    /// the current scope".
    pub fn assign(&mut self, name: &str, value: Value) {
        if self.vars.contains_key(name) {
            self.vars.insert(name.to_owned(), value);
            return;
        }
        if let Some(parent) = &self.parent {
            if parent.borrow().owns(name) {
                parent.borrow_mut().assign(name, value);
                return;
            }
        }
        self.vars.insert(name.to_owned(), value);
    }

    fn owns(&self, name: &str) -> bool {
        self.vars.contains_key(name) || self.parent.as_ref().is_some_and(|p| p.borrow().owns(name))
    }

    /// Snapshot of every variable visible from this scope, innermost wins,
    /// for `ScriptEngine::getVariables`.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        let mut out = match &self.parent {
            Some(parent) => parent.borrow().snapshot(),
            None => HashMap::new(),
        };
        for (k, v) in &self.vars {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}

/// Strict lookup used where an undefined reference should be an error
/// rather than `null` (reserved for future strict-mode builtins).
pub fn require(env: &EnvRef, name: &str, pos: Position) -> ScriptResult<Value> {
    if env.borrow().owns(name) {
        Ok(env.borrow().get(name))
    } else {
        Err(ScriptReferenceError::not_defined(name, pos).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_sees_parent_bindings() {
        let root = Environment::new();
        root.borrow_mut().define("x", Value::Number(1.0));
        let child = Environment::child(&root);
        assert_eq!(child.borrow().get("x"), Value::Number(1.0));
    }

    #[test]
    fn assignment_updates_owning_scope_not_shadowing() {
        let root = Environment::new();
        root.borrow_mut().define("x", Value::Number(1.0));
        let child = Environment::child(&root);
        child.borrow_mut().assign("x", Value::Number(2.0));
        assert_eq!(root.borrow().get("x"), Value::Number(2.0));
        assert!(!child.borrow().vars.contains_key("x"));
    }

    #[test]
    fn assigning_new_name_defines_in_current_scope() {
        let root = Environment::new();
        let child = Environment::child(&root);
        child.borrow_mut().assign("y", Value::Number(3.0));
        assert!(!root.borrow().vars.contains_key("y"));
        assert_eq!(child.borrow().get("y"), Value::Number(3.0));
    }

    #[test]
    fn undefined_variable_reads_as_null() {
        let root = Environment::new();
        assert_eq!(root.borrow().get("missing"), Value::Null);
    }

    #[test]
    fn dotted_path_indexes_object_fields() {
        let root = Environment::new();
        root.borrow_mut().define("o", Value::object(vec![("a".to_owned(), Value::Number(5.0))]));
        assert_eq!(root.borrow().get("o.a"), Value::Number(5.0));
        assert_eq!(root.borrow().get("o.missing"), Value::Null);
    }
}
