//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC-SHA256, constant-time equality, Base64)
//! - Signed bearer-token encoding and verification
//! - Resend-throttle arithmetic (cooldown + rolling-window caps)

pub mod crypto;
pub mod rate_limit;
pub mod token;
