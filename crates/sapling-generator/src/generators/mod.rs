//! Individual value generators.
//!
//! Every generator is a pure function of `(spec, rng, row_index)`; there is
//! no hidden global state, so a seeded RNG reproduces the same values.

pub mod numeric;
pub mod text;
pub mod timestamp;
pub mod uuid;

use rand::Rng;
use sapling_core::{GeneratorSpec, LogicalType, Value};

/// Produce one value for a column from its validated generator spec.
///
/// The declared column type steers rendering-relevant details (a decimal
/// column's precision/scale); everything else depends only on the spec,
/// the RNG state and the row index.
pub fn generate<R: Rng>(
    spec: &GeneratorSpec,
    ty: &LogicalType,
    rng: &mut R,
    index: u64,
) -> Value {
    match spec {
        GeneratorSpec::Sequence { start } => Value::Int(start.wrapping_add(index as i64)),

        GeneratorSpec::IntRange { min, max } => numeric::int_range(rng, *min, *max),

        GeneratorSpec::FloatRange { min, max } => numeric::float_range(rng, *min, *max),

        GeneratorSpec::DecimalRange { min, max } => {
            let (precision, scale) = match ty {
                LogicalType::Decimal { precision, scale } => (*precision, *scale),
                _ => (10, 2),
            };
            numeric::decimal_range(rng, *min, *max, precision, scale)
        }

        GeneratorSpec::Bool { true_weight } => Value::Bool(rng.gen_bool(*true_weight)),

        GeneratorSpec::TimestampRange { start, end } => {
            timestamp::timestamp_range(rng, *start, *end)
        }

        GeneratorSpec::Pattern { pattern } => text::pattern(pattern, rng, index),

        GeneratorSpec::Name => text::name(rng),

        GeneratorSpec::Email => text::email(rng),

        GeneratorSpec::OneOf { values } => {
            let idx = rng.gen_range(0..values.len());
            values[idx].clone()
        }

        GeneratorSpec::Static { value } => value.clone(),

        GeneratorSpec::Uuid => uuid::uuid_v4(rng),

        GeneratorSpec::Null => Value::Null,
    }
}
