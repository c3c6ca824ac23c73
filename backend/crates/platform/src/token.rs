//! Signed Bearer Tokens
//!
//! Compact HMAC-signed tokens carrying a single UUID identity:
//! `base64(uuid_bytes || hmac_sha256(secret, uuid_bytes))`.
//!
//! Verification recomputes the signature and compares it in constant time,
//! so a forged token cannot be distinguished faster by prefix-matching.

use uuid::Uuid;

use crate::crypto::{constant_time_eq, from_base64, hmac_sha256, to_base64};

/// Serialized token length before base64: 16 (UUID) + 32 (HMAC)
const TOKEN_RAW_LEN: usize = 48;

/// Sign a UUID identity into a bearer token
pub fn sign(secret: &[u8; 32], id: Uuid) -> String {
    let id_bytes = id.as_bytes();
    let signature = hmac_sha256(secret, id_bytes);
    let mut raw = Vec::with_capacity(TOKEN_RAW_LEN);
    raw.extend_from_slice(id_bytes);
    raw.extend_from_slice(&signature);
    to_base64(&raw)
}

/// Verify a bearer token and extract the signed UUID
///
/// Returns `None` for malformed base64, wrong length, or a signature that
/// does not match under the given secret.
pub fn verify(secret: &[u8; 32], token: &str) -> Option<Uuid> {
    let raw = from_base64(token).ok()?;
    if raw.len() != TOKEN_RAW_LEN {
        return None;
    }

    let id_bytes: [u8; 16] = raw[0..16].try_into().ok()?;
    let provided_signature: &[u8] = &raw[16..TOKEN_RAW_LEN];

    let expected_signature = hmac_sha256(secret, &id_bytes);
    if !constant_time_eq(provided_signature, &expected_signature) {
        return None;
    }

    Some(Uuid::from_bytes(id_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_sign_verify_roundtrip() {
        let id = Uuid::new_v4();
        let token = sign(&SECRET, id);
        assert_eq!(verify(&SECRET, &token), Some(id));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let id = Uuid::new_v4();
        let token = sign(&SECRET, id);
        let other_secret = [8u8; 32];
        assert_eq!(verify(&other_secret, &token), None);
    }

    #[test]
    fn test_verify_rejects_tampered_identity() {
        let id = Uuid::new_v4();
        let token = sign(&SECRET, id);

        let mut raw = from_base64(&token).unwrap();
        raw[0] ^= 0xFF;
        let tampered = to_base64(&raw);
        assert_eq!(verify(&SECRET, &tampered), None);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert_eq!(verify(&SECRET, ""), None);
        assert_eq!(verify(&SECRET, "not base64!!"), None);
        // Valid base64, wrong length
        assert_eq!(verify(&SECRET, &to_base64(b"short")), None);
    }
}
