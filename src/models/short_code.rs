use std::{fmt::Display, str::FromStr};

use lazy_regex::regex_is_match;
use rand::{distributions::Slice, Rng};

use crate::commands::{user_err, CommandError};

/// URL-safe alphabet, the same one shortid-style codes are drawn from.
const ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', //
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', //
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', //
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', //
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', //
    '-', '_',
];

const GENERATED_LENGTH: usize = 10;

/// A compact identifier that lets a visitor track their intention
/// without authenticating.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn generate() -> ShortCode {
        ShortCode::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with(rng: &mut impl Rng) -> ShortCode {
        let alphabet = Slice::new(ALPHABET).expect("Hard-coded alphabet is not empty");
        ShortCode(rng.sample_iter(alphabet).take(GENERATED_LENGTH).collect())
    }

    pub fn is_valid(s: &str) -> bool {
        regex_is_match!(r#"^[0-9A-Za-z_-]{7,14}$"#, s)
    }
}

impl FromStr for ShortCode {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if ShortCode::is_valid(s) {
            Ok(ShortCode(s.to_string()))
        } else {
            Err(user_err(format!(
                "Invalid intention code: `{}`.\nCodes are 7 to 14 characters long and only contain a-z, A-Z, 0-9, a dash (-) or an underscore (_).",
                s.escape_default()
            )))
        }
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, str::FromStr};

    use rand::{rngs::StdRng, SeedableRng};

    use super::ShortCode;

    #[test]
    fn generated_codes_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let code = ShortCode::generate_with(&mut rng);
            assert!(ShortCode::is_valid(code.as_ref()), "{code}");
        }
    }

    #[test]
    fn generated_codes_do_not_repeat() {
        let codes: HashSet<ShortCode> = (0..1000).map(|_| ShortCode::generate()).collect();

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn parses_shortid_codes() {
        assert!(ShortCode::from_str("PPBqWA9").is_ok());
        assert!(ShortCode::from_str("  S1x-_8Zk0q ").is_ok());
    }

    #[test]
    fn too_short() {
        assert!(ShortCode::from_str("abc").is_err());
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::from_str("abcdefghijklmnop").is_err());
    }

    #[test]
    fn special_char() {
        assert!(ShortCode::from_str("abc!defg").is_err());
    }
}
