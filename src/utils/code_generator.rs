//! Short code generation and validation utilities.
//!
//! Generators only produce candidates. Uniqueness is decided by the store's
//! atomic insert; callers retry on conflict.

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use std::sync::LazyLock;

/// Default number of base62 symbols in a generated code (62^7 ≈ 3.5×10^12).
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Upper bound on the length of any code accepted from a request path.
pub const MAX_CODE_LENGTH: usize = 32;

/// Codes that would shadow system routes.
///
/// A generated code matching one of these is discarded like a collision.
pub const RESERVED_CODES: &[&str] = &["api", "health"];

static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{1,32}$").expect("code pattern is a valid regex")
});

/// Produces candidate short codes.
///
/// Implementations must be unpredictable enough to deter enumeration of the
/// keyspace, but are not required to be collision-free.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Cryptographically secure random base62 generator.
///
/// Draws from the thread-local `rand` generator, which is a CSPRNG seeded
/// from the operating system.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Returns true if `code` could have been issued by this service.
///
/// Used to reject junk path segments before they reach the store.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}

/// Returns true if `code` collides with a system route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_configured_length() {
        assert_eq!(RandomCodeGenerator::default().generate().len(), 7);
        assert_eq!(RandomCodeGenerator::new(12).generate().len(), 12);
    }

    #[test]
    fn test_generate_code_base62_characters() {
        let generator = RandomCodeGenerator::default();
        for _ in 0..100 {
            let code = generator.generate();
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generated_codes_are_valid() {
        let generator = RandomCodeGenerator::default();
        assert!(is_valid_code(&generator.generate()));
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let generator = RandomCodeGenerator::default();
        let codes: HashSet<String> = (0..10_000).map(|_| generator.generate()).collect();

        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn test_generate_code_uses_both_cases() {
        let generator = RandomCodeGenerator::new(32);
        let joined: String = (0..50).map(|_| generator.generate()).collect();

        assert!(joined.chars().any(|c| c.is_ascii_uppercase()));
        assert!(joined.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("abc1234"));
        assert!(is_valid_code("AbC"));
        assert!(is_valid_code(&"a".repeat(MAX_CODE_LENGTH)));

        assert!(!is_valid_code(""));
        assert!(!is_valid_code(&"a".repeat(MAX_CODE_LENGTH + 1)));
        assert!(!is_valid_code("abc-123"));
        assert!(!is_valid_code("abc_123"));
        assert!(!is_valid_code("../etc"));
        assert!(!is_valid_code("ab cd"));
    }

    #[test]
    fn test_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(is_reserved(reserved), "'{}' should be reserved", reserved);
        }
        assert!(!is_reserved("abc1234"));
    }
}
