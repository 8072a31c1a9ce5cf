//! Attribute values and records.
//!
//! Records are open attribute maps: a schema declares columns, but a
//! stored record may carry any set of attributes (engine-managed
//! timestamp columns included). `Value` is the tagged union those
//! attributes take.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// An open attribute map. Ordered so that derived requests (scan
/// filters, update expressions) are deterministic.
pub type Record = BTreeMap<String, Value>;

impl Value {
    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Returns a copy of `record` with every top-level empty-string
/// attribute removed.
///
/// The engine applies this to every mutating input before validation,
/// so callers can pass form-style data without scrubbing it first.
pub fn trim_empty_strings(record: &Record) -> Record {
    record
        .iter()
        .filter(|(_, value)| !value.is_empty_string())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
