//! Timestamp value generator.

use chrono::{DateTime, Utc};
use rand::Rng;
use sapling_core::Value;

/// Generate a random timestamp in the given range (inclusive, second
/// resolution). The range is validated non-inverted at config parse time.
pub fn timestamp_range<R: Rng>(rng: &mut R, start: DateTime<Utc>, end: DateTime<Utc>) -> Value {
    let start_ts = start.timestamp();
    let end_ts = end.timestamp();

    if start_ts >= end_ts {
        return Value::DateTime(start);
    }

    let random_ts = rng.gen_range(start_ts..=end_ts);
    let dt = DateTime::from_timestamp(random_ts, 0).unwrap_or(start);
    Value::DateTime(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_timestamp_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();

        for _ in 0..50 {
            let value = timestamp_range(&mut rng, start, end);
            if let Value::DateTime(dt) = value {
                assert!(dt >= start && dt <= end);
                assert!(dt.year() >= 2020 && dt.year() <= 2024);
            } else {
                panic!("expected DateTime value");
            }
        }
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let at = Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(timestamp_range(&mut rng, at, at), Value::DateTime(at));
    }

    #[test]
    fn test_deterministic() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(
            timestamp_range(&mut rng1, start, end),
            timestamp_range(&mut rng2, start, end)
        );
    }
}
