//! Core value types read from fields and handed to rules.
//!
//! The type system is a closed enum on purpose:
//! - Field adapters produce one of a handful of shapes (text, numbers, flags)
//! - Rules pattern match exhaustively on what they accept
//! - serde handles the enum natively for schema parameters

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value extracted from a field, or a rule parameter.
///
/// Serialized untagged so that schema files can write parameters as plain
/// JSON/TOML scalars (`"min": 3`, `"trim": true`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag (checkbox state, radio selection)
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 text
    String(String),
}

/// The kind of data a rule expects and an adapter produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    String,
    Integer,
    Float,
    Boolean,
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Get the data kind of this value.
    pub fn kind(&self) -> DataKind {
        match self {
            Value::Boolean(_) => DataKind::Boolean,
            Value::Integer(_) => DataKind::Integer,
            Value::Float(_) => DataKind::Float,
            Value::String(_) => DataKind::String,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
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

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{:.4}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

// ============================================================================
// DataKind Implementation
// ============================================================================

impl DataKind {
    /// Check if a value matches this data kind.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (DataKind::String, Value::String(_)) => true,
            (DataKind::Integer, Value::Integer(_)) => true,
            (DataKind::Float, Value::Float(_)) => true,
            // Integer can be used where float is expected (implicit conversion)
            (DataKind::Float, Value::Integer(_)) => true,
            (DataKind::Boolean, Value::Boolean(_)) => true,
            _ => false,
        }
    }

    /// Get a human-readable name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            DataKind::String => "String",
            DataKind::Integer => "Integer",
            DataKind::Float => "Float",
            DataKind::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::from("abc").kind(), DataKind::String);
        assert_eq!(Value::from(3i64).kind(), DataKind::Integer);
        assert_eq!(Value::from(true).kind(), DataKind::Boolean);
    }

    #[test]
    fn test_float_accepts_integer() {
        assert!(DataKind::Float.matches(&Value::Integer(2)));
        assert!(!DataKind::Integer.matches(&Value::Float(2.0)));
        assert_eq!(Value::Integer(2).as_float(), Some(2.0));
    }

    #[test]
    fn test_untagged_params() {
        let values: Vec<Value> = serde_json::from_str(r#"[true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Boolean(true),
                Value::Integer(3),
                Value::Float(2.5),
                Value::String("x".to_string()),
            ]
        );
    }
}
