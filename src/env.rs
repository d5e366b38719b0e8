//! Session environment: identifier bindings and the angle-mode switch.
//!
//! Names are case-insensitive, so `X` and `x` address one binding. The
//! environment is owned by the interpreter session and written only after
//! a statement evaluated successfully, which makes assignment transactional
//! at the statement level. A function call reads through a [`Scope`] that
//! shadows exactly the parameter and delegates everything else.

use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// Angle interpretation for the trigonometric built-ins, toggled by the
/// `angles` session command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleMode::Radians => write!(f, "radians"),
            AngleMode::Degrees => write!(f, "degrees"),
        }
    }
}

/// Read access to bindings, implemented by the session environment and by
/// call scopes layered on top of it.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<&Value>;
    fn angle_mode(&self) -> AngleMode;
}

#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    angle_mode: AngleMode,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Bind `name`, overwriting any previous value (last write wins).
    pub fn define(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_ascii_lowercase(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(&name.to_ascii_lowercase())
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in name order, for the `vars` listing.
    pub fn sorted(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.bindings.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn set_angle_mode(&mut self, mode: AngleMode) {
        self.angle_mode = mode;
    }
}

impl Bindings for Environment {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }
}

/// A child scope for one function call: the parameter shadows the parent,
/// every other lookup falls through.
pub struct Scope<'a> {
    parent: &'a dyn Bindings,
    param: String,
    value: Value,
}

impl<'a> Scope<'a> {
    pub fn new(parent: &'a dyn Bindings, param: &str, value: Value) -> Self {
        Scope {
            parent,
            param: param.to_ascii_lowercase(),
            value,
        }
    }
}

impl Bindings for Scope<'_> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        if name.eq_ignore_ascii_case(&self.param) {
            Some(&self.value)
        } else {
            self.parent.lookup(name)
        }
    }

    fn angle_mode(&self) -> AngleMode {
        self.parent.angle_mode()
    }
}
