//! Run-scoped fact context threaded through guards and rules.
//!
//! A context is rebuilt for every pipeline run and discarded at run end.
//! Guards conventionally publish stable-named facts for the guards and rules
//! that run after them; the core reserves no key names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A typed fact value.
///
/// Rules never coerce across shapes: a [`crate::core::Condition::BooleanFlag`]
/// only accepts `Bool`, numeric comparisons only accept `Integer`/`Float`.
/// Stringification (for set membership and string matching) covers the scalar
/// shapes only; a `List` has no scalar rendering.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum FactValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl FactValue {
    /// Render scalar shapes as a string; `List` yields `None`.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::List(_) => None,
        }
    }

    /// Numeric view; only `Integer` and `Float` qualify.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean view; only `Bool` qualifies, no coercion.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// String-collection view; only `List` qualifies.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Build a `List` fact from any iterable of strings.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FactValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// Transient string-keyed fact map.
///
/// Writes are visible only within the run the context belongs to; the engine
/// creates a fresh context per run and never retains it.
///
/// # Example
///
/// ```rust
/// use billboard::core::{Context, FactValue};
///
/// let mut context = Context::new();
/// context.insert("plan", "pro");
/// context.insert("session_count", 12);
/// context.insert("segments", FactValue::list(["us", "beta"]));
///
/// assert_eq!(context.get("plan").and_then(|f| f.as_scalar_string()), Some("pro".into()));
/// assert_eq!(context.get("session_count").and_then(|f| f.as_number()), Some(12.0));
/// assert!(context.get("missing").is_none());
/// ```
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Context {
    facts: HashMap<String, FactValue>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fact, replacing any previous value under the key.
    pub fn insert<K: Into<String>, V: Into<FactValue>>(&mut self, key: K, value: V) {
        self.facts.insert(key.into(), value.into());
    }

    /// Read a fact.
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.facts.get(key)
    }

    /// Whether a fact is present under the key.
    pub fn contains(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    /// Number of facts currently published.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether no facts are published.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
