//! Generated value representation.
//!
//! `Value` is the type-agnostic runtime value produced by the field
//! generators and carried through batches until a sink renders it into its
//! external string form.

use crate::types::LogicalType;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single generated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Text value
    Text(String),

    /// Date/time with timezone
    DateTime(DateTime<Utc>),

    /// Decimal stored as string with precision info
    Decimal {
        /// String representation of the decimal value
        value: String,
        /// Total number of digits
        precision: u8,
        /// Number of digits after the decimal point
        scale: u8,
    },

    /// UUID value
    Uuid(Uuid),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render this value into the external (sink) string form.
    ///
    /// Null renders as an empty field; datetimes as RFC 3339; decimals as
    /// their plain string representation.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::DateTime(dt) => dt.to_rfc3339(),
            Self::Decimal { value, .. } => value.clone(),
            Self::Uuid(u) => u.to_string(),
        }
    }

    /// Whether this value satisfies the given declared column type.
    ///
    /// Null satisfies every type (nullability is enforced separately).
    /// Integers are accepted where floats or decimals are declared.
    pub fn satisfies(&self, ty: &LogicalType) -> bool {
        match (self, ty) {
            (Self::Null, _) => true,
            (Self::Int(_), LogicalType::Integer) => true,
            (Self::Int(_) | Self::Float(_), LogicalType::Float) => true,
            (Self::Int(_) | Self::Float(_) | Self::Decimal { .. }, LogicalType::Decimal { .. }) => {
                true
            }
            (Self::Text(_) | Self::Uuid(_), LogicalType::String) => true,
            (Self::Bool(_), LogicalType::Boolean) => true,
            (Self::DateTime(_), LogicalType::Datetime) => true,
            _ => false,
        }
    }

    /// Convert a scalar YAML value (from `static` / `one_of` parameters)
    /// into a `Value`. Sequences and mappings are not valid field values.
    pub fn from_yaml(yaml: &serde_yaml::Value) -> Option<Value> {
        match yaml {
            serde_yaml::Value::Null => Some(Value::Null),
            serde_yaml::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            serde_yaml::Value::String(s) => Some(Value::Text(s.clone())),
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(&tagged.value),
            _ => None,
        }
    }
}
