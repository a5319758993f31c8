//! Configuration values and their type tags
//!
//! Values are stored as text by every durable backend. The in-memory backend
//! keeps them as they were handed in, which is why the richer [`Value`] enum
//! exists at all.

use crate::error::{ConfVaultError, Result};
use std::fmt;
use std::str::FromStr;

/// A configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    Bytes(Vec<u8>),
}

impl Value {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Bool(_) => ValueKind::Bool,
            Value::List(_) => ValueKind::List,
            Value::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Informative type tag recorded next to stored text
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Borrow the text when this is a `Str`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Text representation used by durable backends
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Collapse the value to a `Str` holding its text representation
    pub fn stringify(self) -> Value {
        match self {
            Value::Str(_) => self,
            other => Value::Str(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// The fixed allow-list of option types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Str,
    Bool,
    List,
    Bytes,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Str,
        ValueKind::Bool,
        ValueKind::List,
        ValueKind::Bytes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
            ValueKind::Bytes => "bytes",
        }
    }

    /// Convert a typed-in answer to this kind
    pub fn parse(&self, text: &str) -> std::result::Result<Value, String> {
        match self {
            ValueKind::Int => text
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| e.to_string()),
            ValueKind::Float => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| e.to_string()),
            ValueKind::Str => Ok(Value::Str(text.to_string())),
            ValueKind::Bool => match text.trim().to_lowercase().as_str() {
                "true" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            ValueKind::List => {
                let inner = text.trim();
                let inner = inner
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .unwrap_or(inner);
                if inner.trim().is_empty() {
                    return Ok(Value::List(Vec::new()));
                }
                Ok(Value::List(
                    inner
                        .split(',')
                        .map(|item| Value::Str(item.trim().to_string()))
                        .collect(),
                ))
            }
            ValueKind::Bytes => Ok(Value::Bytes(text.as_bytes().to_vec())),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = ConfVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => Ok(ValueKind::Int),
            "float" => Ok(ValueKind::Float),
            "str" | "string" => Ok(ValueKind::Str),
            "bool" | "boolean" => Ok(ValueKind::Bool),
            "list" => Ok(ValueKind::List),
            "bytes" => Ok(ValueKind::Bytes),
            other => Err(ConfVaultError::illegal_argument(format!(
                "'{other}' is not a supported option type (expected one of: {})",
                ValueKind::ALL
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}
