//! Text value generators: patterns, names and email-shaped strings.
//!
//! Pattern placeholders:
//! - `{index}` - row index
//! - `{rand:N}` - random N-digit number

use rand::Rng;
use sapling_core::Value;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Ben", "Carla", "Diego", "Elena", "Farid", "Grace", "Hugo", "Ines", "Jonas", "Kira",
    "Liam", "Mona", "Nils", "Olga", "Pavel", "Quinn", "Rosa", "Sam", "Tessa", "Umar", "Vera",
    "Wes", "Yuki",
];

const LAST_NAMES: &[&str] = &[
    "Andersen", "Brooks", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Hansen", "Ito",
    "Jensen", "Kowalski", "Larsen", "Moreau", "Nguyen", "Okafor", "Petrov", "Quigley", "Rossi",
    "Sato", "Tanaka", "Ueda", "Vargas", "Weber", "Zhang",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "mail.test", "corp.test"];

/// Generate a string based on a pattern with placeholders.
pub fn pattern<R: Rng>(pattern: &str, rng: &mut R, index: u64) -> Value {
    let mut result = pattern.replace("{index}", &index.to_string());

    // Replace {rand:N} placeholders left to right
    while let Some(start) = result.find("{rand:") {
        let Some(rel_end) = result[start..].find('}') else {
            break;
        };
        let end = start + rel_end;
        let digits_str = &result[start + 6..end];
        let Ok(digits) = digits_str.parse::<usize>() else {
            break;
        };
        let random_num = random_digits(rng, digits);
        result = format!("{}{}{}", &result[..start], random_num, &result[end + 1..]);
    }

    Value::Text(result)
}

/// Generate a full name from the built-in pools.
pub fn name<R: Rng>(rng: &mut R) -> Value {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    Value::Text(format!("{first} {last}"))
}

/// Generate an email-shaped string from the name pools.
pub fn email<R: Rng>(rng: &mut R) -> Value {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())].to_lowercase();
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())].to_lowercase();
    let num = rng.gen_range(1..1000u32);
    let domain = EMAIL_DOMAINS[rng.gen_range(0..EMAIL_DOMAINS.len())];
    Value::Text(format!("{first}.{last}{num}@{domain}"))
}

/// Generate a random number with exactly N digits, no leading zero.
fn random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    if digits == 0 {
        return String::new();
    }

    let mut result = String::with_capacity(digits);
    result.push(char::from_digit(rng.gen_range(1..10), 10).unwrap());
    for _ in 1..digits {
        result.push(char::from_digit(rng.gen_range(0..10), 10).unwrap());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pattern_index() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = pattern("user_{index}@example.com", &mut rng, 123);

        assert_eq!(value, Value::Text("user_123@example.com".to_string()));
    }

    #[test]
    fn test_pattern_random_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = pattern("code-{rand:6}", &mut rng, 0);

        if let Value::Text(s) = value {
            assert!(s.starts_with("code-"));
            assert_eq!(s.len(), 5 + 6);
            assert!(s[5..].chars().all(|c| c.is_ascii_digit()));
        } else {
            panic!("expected Text value");
        }
    }

    #[test]
    fn test_pattern_multiple_placeholders() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = pattern("user_{index}_code_{rand:4}", &mut rng, 42);

        if let Value::Text(s) = value {
            assert!(s.starts_with("user_42_code_"));
            assert_eq!(s.len(), 13 + 4);
        } else {
            panic!("expected Text value");
        }
    }

    #[test]
    fn test_name_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        if let Value::Text(s) = name(&mut rng) {
            let parts: Vec<&str> = s.split(' ').collect();
            assert_eq!(parts.len(), 2);
            assert!(!parts[0].is_empty() && !parts[1].is_empty());
        } else {
            panic!("expected Text value");
        }
    }

    #[test]
    fn test_email_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        if let Value::Text(s) = email(&mut rng) {
            assert!(s.contains('@'));
            assert!(s.contains('.'));
            assert_eq!(s, s.to_lowercase());
        } else {
            panic!("expected Text value");
        }
    }

    #[test]
    fn test_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(9);
        let mut rng2 = StdRng::seed_from_u64(9);
        assert_eq!(name(&mut rng1), name(&mut rng2));
        assert_eq!(email(&mut rng1), email(&mut rng2));
    }
}
