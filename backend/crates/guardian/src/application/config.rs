//! Application Configuration
//!
//! Configuration for the guardian application layer.

use platform::rate_limit::ResendThrottle;
use std::time::Duration;

use crate::domain::value_objects::Locale;

/// Guardian application configuration
#[derive(Debug, Clone)]
pub struct GuardianConfig {
    /// One-time code validity
    pub code_ttl: Duration,
    /// Issuance throttle per (child, guardian email) pair
    pub throttle: ResendThrottle,
    /// Secret keying the stored code digests (32 bytes)
    pub code_secret: [u8; 32],
    /// Secret verifying child bearer tokens (32 bytes)
    pub session_secret: [u8; 32],
    /// Locale used when the child profile has none
    pub default_locale: Locale,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::from_secs(15 * 60),
            throttle: ResendThrottle::default(),
            code_secret: [0u8; 32],
            session_secret: [0u8; 32],
            default_locale: Locale::En,
        }
    }
}

impl GuardianConfig {
    /// Create config with random secrets (for development)
    pub fn with_random_secrets() -> Self {
        let mut code_secret = [0u8; 32];
        code_secret.copy_from_slice(&platform::crypto::random_bytes(32));
        let mut session_secret = [0u8; 32];
        session_secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            code_secret,
            session_secret,
            ..Default::default()
        }
    }

    pub fn code_ttl_secs(&self) -> u64 {
        self.code_ttl.as_secs()
    }

    pub fn code_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.code_ttl.as_secs() as i64)
    }

    pub fn window_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.throttle.window_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardianConfig::default();

        assert_eq!(config.code_ttl, Duration::from_secs(900));
        assert_eq!(config.code_ttl_secs(), 900);
        assert_eq!(config.throttle.cooldown, Duration::from_secs(60));
        assert_eq!(config.throttle.max_per_window, 5);
        assert_eq!(config.throttle.window, Duration::from_secs(86_400));
        assert_eq!(config.default_locale, Locale::En);
    }

    #[test]
    fn test_with_random_secrets() {
        let config1 = GuardianConfig::with_random_secrets();
        let config2 = GuardianConfig::with_random_secrets();

        assert_ne!(config1.code_secret, config2.code_secret);
        assert_ne!(config1.session_secret, config2.session_secret);
        assert_ne!(config1.code_secret, config1.session_secret);
        assert!(config1.code_secret.iter().any(|&b| b != 0));
    }
}
