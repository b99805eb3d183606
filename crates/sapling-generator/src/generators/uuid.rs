//! UUID value generator.

use rand::Rng;
use sapling_core::Value;
use uuid::Uuid;

/// Generate a UUID v4 from the provided RNG, so seeded runs reproduce the
/// same identifiers.
pub fn uuid_v4<R: Rng>(rng: &mut R) -> Value {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Value::Uuid(Uuid::from_bytes(bytes))
}
