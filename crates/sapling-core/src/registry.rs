//! Field generator registry.
//!
//! Every column names its generator by identifier; the registry maps that
//! identifier to a parameter-validated [`GeneratorSpec`] at configuration
//! parse time, so a typo or a bad option surfaces before any row is
//! generated. The value-producing functions themselves live in the
//! `sapling-generator` crate; this module owns the identifier space and the
//! accepted option set of each generator.

use crate::types::LogicalType;
use crate::values::Value;
use chrono::{DateTime, Utc};
use serde_yaml::Mapping;

/// A generator known to the registry, before parameter validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Monotonic integer sequence
    Sequence,
    /// Random integer in an inclusive range
    IntRange,
    /// Random float in an inclusive range
    FloatRange,
    /// Random decimal in a range, scaled per the column type
    DecimalRange,
    /// Weighted boolean
    Bool,
    /// Random timestamp in a bounded range
    TimestampRange,
    /// Pattern string with `{index}` and `{rand:N}` placeholders
    Pattern,
    /// Human full name from a fixed pool
    Name,
    /// Email-shaped text derived from the name pools
    Email,
    /// Random pick from a fixed list of scalar values
    OneOf,
    /// A single fixed scalar value
    Static,
    /// Random UUID v4 drawn from the seeded RNG
    Uuid,
    /// Always null
    Null,
}

/// Resolve a generator identifier to its registry entry.
pub fn resolve(id: &str) -> Option<GeneratorKind> {
    match id {
        "sequence" => Some(GeneratorKind::Sequence),
        "int_range" => Some(GeneratorKind::IntRange),
        "float_range" => Some(GeneratorKind::FloatRange),
        "decimal_range" => Some(GeneratorKind::DecimalRange),
        "bool" => Some(GeneratorKind::Bool),
        "timestamp_range" => Some(GeneratorKind::TimestampRange),
        "pattern" => Some(GeneratorKind::Pattern),
        "name" => Some(GeneratorKind::Name),
        "email" => Some(GeneratorKind::Email),
        "one_of" => Some(GeneratorKind::OneOf),
        "static" => Some(GeneratorKind::Static),
        "uuid" => Some(GeneratorKind::Uuid),
        "null" => Some(GeneratorKind::Null),
        _ => None,
    }
}

/// Validated generator configuration, ready for value production.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorSpec {
    /// Sequential integers starting at `start` (row index 0 yields `start`)
    Sequence {
        /// First emitted value
        start: i64,
    },

    /// Random integers in `min..=max`
    IntRange { min: i64, max: i64 },

    /// Random floats in `min..=max`
    FloatRange { min: f64, max: f64 },

    /// Random decimals in `min..=max`; the column's declared precision and
    /// scale drive the rendering
    DecimalRange { min: f64, max: f64 },

    /// Boolean with the given probability of `true`
    Bool {
        /// Weight for true (0.0 to 1.0)
        true_weight: f64,
    },

    /// Random timestamps between `start` and `end` (inclusive)
    TimestampRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Pattern string with placeholders
    Pattern { pattern: String },

    /// Full name from the built-in pools
    Name,

    /// Email-shaped text
    Email,

    /// Random selection from a pool of scalar values
    OneOf { values: Vec<Value> },

    /// A fixed scalar value
    Static { value: Value },

    /// RNG-derived UUID v4
    Uuid,

    /// Null value (for nullable columns)
    Null,
}

impl GeneratorKind {
    /// The registry identifier of this generator.
    pub fn id(&self) -> &'static str {
        match self {
            GeneratorKind::Sequence => "sequence",
            GeneratorKind::IntRange => "int_range",
            GeneratorKind::FloatRange => "float_range",
            GeneratorKind::DecimalRange => "decimal_range",
            GeneratorKind::Bool => "bool",
            GeneratorKind::TimestampRange => "timestamp_range",
            GeneratorKind::Pattern => "pattern",
            GeneratorKind::Name => "name",
            GeneratorKind::Email => "email",
            GeneratorKind::OneOf => "one_of",
            GeneratorKind::Static => "static",
            GeneratorKind::Uuid => "uuid",
            GeneratorKind::Null => "null",
        }
    }

    /// Option names this generator accepts.
    fn accepted_options(&self) -> &'static [&'static str] {
        match self {
            GeneratorKind::Sequence => &["start"],
            GeneratorKind::IntRange => &["min", "max"],
            GeneratorKind::FloatRange => &["min", "max"],
            GeneratorKind::DecimalRange => &["min", "max"],
            GeneratorKind::Bool => &["true_weight"],
            GeneratorKind::TimestampRange => &["start", "end"],
            GeneratorKind::Pattern => &["pattern"],
            GeneratorKind::Name => &[],
            GeneratorKind::Email => &[],
            GeneratorKind::OneOf => &["values"],
            GeneratorKind::Static => &["value"],
            GeneratorKind::Uuid => &[],
            GeneratorKind::Null => &[],
        }
    }

    /// Validate raw YAML parameters against this generator's option set.
    ///
    /// Returns the typed spec, or a human-readable reason on failure. The
    /// caller wraps the reason with the table/column path.
    pub fn validate(&self, params: &Mapping) -> Result<GeneratorSpec, String> {
        check_option_names(params, self.accepted_options())?;

        match self {
            GeneratorKind::Sequence => Ok(GeneratorSpec::Sequence {
                start: opt_i64(params, "start")?.unwrap_or(1),
            }),

            GeneratorKind::IntRange => {
                let min = req_i64(params, "min")?;
                let max = req_i64(params, "max")?;
                if min > max {
                    return Err(format!("min ({min}) exceeds max ({max})"));
                }
                Ok(GeneratorSpec::IntRange { min, max })
            }

            GeneratorKind::FloatRange => {
                let min = req_f64(params, "min")?;
                let max = req_f64(params, "max")?;
                if min > max {
                    return Err(format!("min ({min}) exceeds max ({max})"));
                }
                Ok(GeneratorSpec::FloatRange { min, max })
            }

            GeneratorKind::DecimalRange => {
                let min = req_f64(params, "min")?;
                let max = req_f64(params, "max")?;
                if min > max {
                    return Err(format!("min ({min}) exceeds max ({max})"));
                }
                Ok(GeneratorSpec::DecimalRange { min, max })
            }

            GeneratorKind::Bool => {
                let true_weight = opt_f64(params, "true_weight")?.unwrap_or(0.5);
                if !(0.0..=1.0).contains(&true_weight) {
                    return Err(format!("true_weight ({true_weight}) must be within 0.0..=1.0"));
                }
                Ok(GeneratorSpec::Bool { true_weight })
            }

            GeneratorKind::TimestampRange => {
                let start = parse_timestamp(&req_str(params, "start")?)
                    .ok_or_else(|| "start is not a valid timestamp".to_string())?;
                let end = parse_timestamp(&req_str(params, "end")?)
                    .ok_or_else(|| "end is not a valid timestamp".to_string())?;
                if start > end {
                    return Err("start is after end".to_string());
                }
                Ok(GeneratorSpec::TimestampRange { start, end })
            }

            GeneratorKind::Pattern => Ok(GeneratorSpec::Pattern {
                pattern: req_str(params, "pattern")?,
            }),

            GeneratorKind::Name => Ok(GeneratorSpec::Name),
            GeneratorKind::Email => Ok(GeneratorSpec::Email),

            GeneratorKind::OneOf => {
                let raw = params
                    .get("values")
                    .ok_or_else(|| "missing required option 'values'".to_string())?;
                let seq = raw
                    .as_sequence()
                    .ok_or_else(|| "'values' must be a list of scalars".to_string())?;
                if seq.is_empty() {
                    return Err("'values' must not be empty".to_string());
                }
                let values = seq
                    .iter()
                    .map(|v| {
                        Value::from_yaml(v)
                            .ok_or_else(|| "'values' entries must be scalars".to_string())
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GeneratorSpec::OneOf { values })
            }

            GeneratorKind::Static => {
                let raw = params
                    .get("value")
                    .ok_or_else(|| "missing required option 'value'".to_string())?;
                let value = Value::from_yaml(raw)
                    .ok_or_else(|| "'value' must be a scalar".to_string())?;
                Ok(GeneratorSpec::Static { value })
            }

            GeneratorKind::Uuid => Ok(GeneratorSpec::Uuid),
            GeneratorKind::Null => Ok(GeneratorSpec::Null),
        }
    }
}

impl GeneratorSpec {
    /// Whether this generator can feed a column of the given declared type.
    ///
    /// `one_of`/`static` are checked value-by-value; `null` feeds anything.
    pub fn feeds(&self, ty: &LogicalType) -> bool {
        match self {
            GeneratorSpec::Sequence { .. } | GeneratorSpec::IntRange { .. } => {
                matches!(
                    ty,
                    LogicalType::Integer | LogicalType::Float | LogicalType::Decimal { .. }
                )
            }
            GeneratorSpec::FloatRange { .. } => matches!(ty, LogicalType::Float),
            GeneratorSpec::DecimalRange { .. } => matches!(ty, LogicalType::Decimal { .. }),
            GeneratorSpec::Bool { .. } => matches!(ty, LogicalType::Boolean),
            GeneratorSpec::TimestampRange { .. } => matches!(ty, LogicalType::Datetime),
            GeneratorSpec::Pattern { .. }
            | GeneratorSpec::Name
            | GeneratorSpec::Email
            | GeneratorSpec::Uuid => matches!(ty, LogicalType::String),
            GeneratorSpec::OneOf { values } => values.iter().all(|v| v.satisfies(ty)),
            GeneratorSpec::Static { value } => value.satisfies(ty),
            GeneratorSpec::Null => true,
        }
    }
}

fn check_option_names(params: &Mapping, accepted: &'static [&'static str]) -> Result<(), String> {
    for key in params.keys() {
        let name = key.as_str().ok_or_else(|| "option names must be strings".to_string())?;
        if !accepted.contains(&name) {
            return Err(if accepted.is_empty() {
                format!("unknown option '{name}' (generator takes no options)")
            } else {
                format!("unknown option '{name}' (accepted: {})", accepted.join(", "))
            });
        }
    }
    Ok(())
}

fn opt_i64(params: &Mapping, key: &str) -> Result<Option<i64>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("option '{key}' must be an integer")),
    }
}

fn req_i64(params: &Mapping, key: &str) -> Result<i64, String> {
    opt_i64(params, key)?.ok_or_else(|| format!("missing required option '{key}'"))
}

fn opt_f64(params: &Mapping, key: &str) -> Result<Option<f64>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("option '{key}' must be a number")),
    }
}

fn req_f64(params: &Mapping, key: &str) -> Result<f64, String> {
    opt_f64(params, key)?.ok_or_else(|| format!("missing required option '{key}'"))
}

fn req_str(params: &Mapping, key: &str) -> Result<String, String> {
    match params.get(key) {
        None => Err(format!("missing required option '{key}'")),
        Some(v) => v
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| format!("option '{key}' must be a string")),
    }
}

/// Parse a timestamp in RFC 3339 or bare `YYYY-MM-DD` form.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
