//! Numeric value generators.

use rand::Rng;
use sapling_core::Value;

/// Generate a random integer in the given range (inclusive).
pub fn int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> Value {
    Value::Int(rng.gen_range(min..=max))
}

/// Generate a random float in the given range (inclusive).
pub fn float_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> Value {
    Value::Float(rng.gen_range(min..=max))
}

/// Generate a random decimal in the given range, formatted to `scale`
/// fractional digits.
pub fn decimal_range<R: Rng>(rng: &mut R, min: f64, max: f64, precision: u8, scale: u8) -> Value {
    let value = rng.gen_range(min..=max);
    Value::Decimal {
        value: format!("{value:.prec$}", prec = scale as usize),
        precision,
        scale,
    }
}
