//! Domain Services
//!
//! Pure logic for one-time code generation and digest checks.

use platform::crypto::{constant_time_eq, hmac_sha256};
use rand::{Rng, rngs::OsRng};

use crate::domain::value_objects::VerificationCode;

/// Number of distinct 6-digit codes
const CODE_SPACE: u32 = 1_000_000;

/// Draw a uniformly random zero-padded 6-digit code from the OS CSPRNG
pub fn generate_code() -> VerificationCode {
    // gen_range performs rejection sampling, so the draw is unbiased
    let n = OsRng.gen_range(0..CODE_SPACE);
    VerificationCode::from_trusted(format!("{n:06}"))
}

/// Keyed digest of the exact code string (no whitespace, no separators)
pub fn hash_code(secret: &[u8; 32], code: &VerificationCode) -> [u8; 32] {
    hmac_sha256(secret, code.as_str().as_bytes())
}

/// Compare a submitted candidate against a stored digest in constant time
pub fn code_matches(secret: &[u8; 32], candidate: &VerificationCode, stored_hash: &[u8]) -> bool {
    let digest = hash_code(secret, candidate);
    constant_time_eq(&digest, stored_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [5u8; 32];

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..256 {
            let code = generate_code();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
            // Round-trips through the public parser
            assert!(VerificationCode::parse(code.as_str()).is_ok());
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let first = generate_code();
        let mut saw_different = false;
        for _ in 0..64 {
            if generate_code() != first {
                saw_different = true;
                break;
            }
        }
        assert!(saw_different, "64 draws should not all collide");
    }

    #[test]
    fn test_hash_is_deterministic() {
        let code = VerificationCode::parse("482913").unwrap();
        assert_eq!(hash_code(&SECRET, &code), hash_code(&SECRET, &code));
    }

    #[test]
    fn test_hash_depends_on_code_and_secret() {
        let code = VerificationCode::parse("482913").unwrap();
        let other = VerificationCode::parse("482914").unwrap();
        assert_ne!(hash_code(&SECRET, &code), hash_code(&SECRET, &other));

        let other_secret = [6u8; 32];
        assert_ne!(hash_code(&SECRET, &code), hash_code(&other_secret, &code));
    }

    #[test]
    fn test_code_matches() {
        let code = VerificationCode::parse("000042").unwrap();
        let stored = hash_code(&SECRET, &code);

        assert!(code_matches(&SECRET, &code, &stored));

        let wrong = VerificationCode::parse("000043").unwrap();
        assert!(!code_matches(&SECRET, &wrong, &stored));

        // A truncated stored digest never matches
        assert!(!code_matches(&SECRET, &code, &stored[..16]));
    }
}
