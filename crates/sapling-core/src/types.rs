//! Logical column types for the datasapling schema model.
//!
//! `LogicalType` is the declared type universe of the configuration. Sinks
//! derive their rendering from it (RFC 3339 for datetimes, plain strings for
//! decimals), and the schema validator uses it to check that a column's
//! generator produces compatible values.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared logical type of a column.
///
/// # YAML Format
///
/// Simple types are plain strings:
/// ```yaml
/// type: integer
/// type: string
/// ```
///
/// Decimal carries precision and scale in object form:
/// ```yaml
/// type:
///   type: decimal
///   precision: 10
///   scale: 2
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
    /// 64-bit signed integer
    Integer,

    /// 64-bit IEEE 754 floating point
    Float,

    /// Unbounded text
    String,

    /// Boolean value
    Boolean,

    /// Timestamp with timezone, rendered as RFC 3339
    Datetime,

    /// Exact decimal with precision and scale, rendered as a plain string
    Decimal {
        /// Total number of digits
        precision: u8,
        /// Number of digits after the decimal point
        scale: u8,
    },
}

impl LogicalType {
    /// Short name used in error messages and serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Integer => "integer",
            LogicalType::Float => "float",
            LogicalType::String => "string",
            LogicalType::Boolean => "boolean",
            LogicalType::Datetime => "datetime",
            LogicalType::Decimal { .. } => "decimal",
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal({precision},{scale})")
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Untagged wire representation: either a bare string or an object form.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRepr {
    Simple(String),
    Complex {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        precision: Option<u8>,
        #[serde(default)]
        scale: Option<u8>,
    },
}

impl<'de> Deserialize<'de> for LogicalType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TypeRepr::deserialize(deserializer)? {
            TypeRepr::Simple(name) => simple_type(&name)
                .ok_or_else(|| DeError::custom(format!("unknown logical type '{name}'"))),
            TypeRepr::Complex {
                kind,
                precision,
                scale,
            } => match kind.as_str() {
                "decimal" => Ok(LogicalType::Decimal {
                    precision: precision.unwrap_or(10),
                    scale: scale.unwrap_or(2),
                }),
                other => simple_type(other)
                    .ok_or_else(|| DeError::custom(format!("unknown logical type '{other}'"))),
            },
        }
    }
}

impl Serialize for LogicalType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogicalType::Decimal { precision, scale } => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "decimal")?;
                map.serialize_entry("precision", precision)?;
                map.serialize_entry("scale", scale)?;
                map.end()
            }
            other => serializer.serialize_str(other.name()),
        }
    }
}

fn simple_type(name: &str) -> Option<LogicalType> {
    match name {
        "integer" | "int" => Some(LogicalType::Integer),
        "float" | "double" => Some(LogicalType::Float),
        "string" | "text" => Some(LogicalType::String),
        "boolean" | "bool" => Some(LogicalType::Boolean),
        "datetime" | "timestamp" => Some(LogicalType::Datetime),
        "decimal" => Some(LogicalType::Decimal {
            precision: 10,
            scale: 2,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_types() {
        let ty: LogicalType = serde_yaml::from_str("integer").unwrap();
        assert_eq!(ty, LogicalType::Integer);

        let ty: LogicalType = serde_yaml::from_str("datetime").unwrap();
        assert_eq!(ty, LogicalType::Datetime);

        // Aliases
        let ty: LogicalType = serde_yaml::from_str("bool").unwrap();
        assert_eq!(ty, LogicalType::Boolean);
    }

    #[test]
    fn test_parse_decimal_with_params() {
        let ty: LogicalType = serde_yaml::from_str("{ type: decimal, precision: 12, scale: 4 }")
            .unwrap();
        assert_eq!(
            ty,
            LogicalType::Decimal {
                precision: 12,
                scale: 4
            }
        );
    }

    #[test]
    fn test_parse_bare_decimal_defaults() {
        let ty: LogicalType = serde_yaml::from_str("decimal").unwrap();
        assert_eq!(
            ty,
            LogicalType::Decimal {
                precision: 10,
                scale: 2
            }
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        let result: Result<LogicalType, _> = serde_yaml::from_str("varchar2");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        for ty in [
            LogicalType::Integer,
            LogicalType::String,
            LogicalType::Decimal {
                precision: 8,
                scale: 3,
            },
        ] {
            let yaml = serde_yaml::to_string(&ty).unwrap();
            let parsed: LogicalType = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(ty, parsed);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(LogicalType::Integer.to_string(), "integer");
        assert_eq!(
            LogicalType::Decimal {
                precision: 10,
                scale: 2
            }
            .to_string(),
            "decimal(10,2)"
        );
    }
}
