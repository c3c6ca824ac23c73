//! Domain Value Objects
//!
//! Validated, normalized value types for the guardian domain.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Maximum email length accepted by the product contract
pub const EMAIL_MAX_LENGTH: usize = 255;

/// Maximum child display-name length (characters after normalization)
pub const DISPLAY_NAME_MAX_LENGTH: usize = 100;

/// One-time code length in digits
pub const CODE_LENGTH: usize = 6;

// ============================================================================
// Email
// ============================================================================

/// Email address value object
///
/// Normalization (trim + lowercase) happens before validation, so two
/// spellings of the same address always resolve to the same stored value.
/// Basic shape validation only - ownership is proven by the code flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with normalization and validation
    pub fn new(email: impl Into<String>) -> AppResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Invalid email format"));
        }

        Ok(Self(email))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return false;
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() || local.len() > 64 {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen
        if domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        if domain.starts_with('-') || domain.ends_with('-') {
            return false;
        }

        true
    }

    /// Create from database value (assumed already normalized)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the domain part of the email
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// DisplayName
// ============================================================================

/// Child display name used only for email personalization
///
/// NFKC-normalized and trimmed; control characters are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(input: impl AsRef<str>) -> AppResult<Self> {
        let name: String = input.as_ref().nfkc().collect::<String>().trim().to_string();

        if name.is_empty() {
            return Err(AppError::bad_request("Name cannot be empty"));
        }

        if name.chars().count() > DISPLAY_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {} characters",
                DISPLAY_NAME_MAX_LENGTH
            )));
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(AppError::bad_request("Name contains invalid characters"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// VerificationCode
// ============================================================================

/// One-time verification code: exactly six ASCII digits
///
/// Input is matched as-is; no trimming or separator stripping happens, so
/// anything but six digits is rejected before the store is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn parse(input: impl AsRef<str>) -> AppResult<Self> {
        let code = input.as_ref();
        if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::bad_request(format!(
                "Code must be exactly {} digits",
                CODE_LENGTH
            )));
        }
        Ok(Self(code.to_string()))
    }

    /// Construct from a value known to be six digits (the generator)
    pub(crate) fn from_trusted(code: String) -> Self {
        debug_assert!(code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit()));
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Locale
// ============================================================================

/// Supported email locales, with English as the product default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
    Ja,
}

impl Locale {
    /// Parse a BCP 47-ish tag; unknown tags yield `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.split(['-', '_']).next().unwrap_or("") {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Ja => "ja",
        }
    }
}

// ============================================================================
// LinkStatus / VerificationMethod
// ============================================================================

/// Lifecycle status of a guardian link
///
/// `pending -> verified` is final; `pending -> expired` can be re-armed to
/// `pending` by a new issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Pending,
    Verified,
    Expired,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Pending => "pending",
            LinkStatus::Verified => "verified",
            LinkStatus::Expired => "expired",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(LinkStatus::Pending),
            "verified" => Some(LinkStatus::Verified),
            "expired" => Some(LinkStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How guardian ownership of the email is proven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMethod {
    EmailCode,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::EmailCode => "email_code",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "email_code" => Some(VerificationMethod::EmailCode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod email {
        use super::*;

        #[test]
        fn test_email_valid() {
            assert!(Email::new("guardian@example.com").is_ok());
            assert!(Email::new("Guardian@Example.COM").is_ok());
            assert!(Email::new("parent.name@example.co.jp").is_ok());
            assert!(Email::new("parent+tag@example.com").is_ok());
        }

        #[test]
        fn test_email_invalid() {
            assert!(Email::new("").is_err());
            assert!(Email::new("guardianexample.com").is_err());
            assert!(Email::new("guardian@").is_err());
            assert!(Email::new("@example.com").is_err());
            assert!(Email::new("guardian@@example.com").is_err());
            assert!(Email::new("guardian@example").is_err());
        }

        #[test]
        fn test_email_normalization() {
            let email = Email::new("  Guardian@Example.COM ").unwrap();
            assert_eq!(email.as_str(), "guardian@example.com");
        }

        #[test]
        fn test_email_max_length() {
            let local = "a".repeat(64);
            let domain = format!("{}.com", "b".repeat(200));
            let long = format!("{local}@{domain}");
            assert!(long.len() > EMAIL_MAX_LENGTH);
            assert!(Email::new(long).is_err());
        }

        #[test]
        fn test_email_domain() {
            let email = Email::new("guardian@example.com").unwrap();
            assert_eq!(email.domain(), "example.com");
        }
    }

    mod display_name {
        use super::*;

        #[test]
        fn test_name_trimmed() {
            let name = DisplayName::new("  Sam  ").unwrap();
            assert_eq!(name.as_str(), "Sam");
        }

        #[test]
        fn test_name_unicode_ok() {
            assert!(DisplayName::new("さくら").is_ok());
            assert!(DisplayName::new("José").is_ok());
        }

        #[test]
        fn test_name_empty_rejected() {
            assert!(DisplayName::new("").is_err());
            assert!(DisplayName::new("   ").is_err());
        }

        #[test]
        fn test_name_too_long_rejected() {
            let input = "a".repeat(DISPLAY_NAME_MAX_LENGTH + 1);
            assert!(DisplayName::new(&input).is_err());
            let input = "a".repeat(DISPLAY_NAME_MAX_LENGTH);
            assert!(DisplayName::new(&input).is_ok());
        }

        #[test]
        fn test_name_control_chars_rejected() {
            assert!(DisplayName::new("Sam\u{0007}").is_err());
        }
    }

    mod verification_code {
        use super::*;

        #[test]
        fn test_code_valid() {
            assert!(VerificationCode::parse("000000").is_ok());
            assert!(VerificationCode::parse("482913").is_ok());
            assert!(VerificationCode::parse("999999").is_ok());
        }

        #[test]
        fn test_code_invalid() {
            assert!(VerificationCode::parse("").is_err());
            assert!(VerificationCode::parse("12345").is_err());
            assert!(VerificationCode::parse("1234567").is_err());
            assert!(VerificationCode::parse("12a456").is_err());
            assert!(VerificationCode::parse(" 123456").is_err());
            assert!(VerificationCode::parse("123456 ").is_err());
            // Non-ASCII digits are not codes
            assert!(VerificationCode::parse("１２３４５６").is_err());
        }
    }

    mod locale {
        use super::*;

        #[test]
        fn test_locale_from_tag() {
            assert_eq!(Locale::from_tag("en"), Some(Locale::En));
            assert_eq!(Locale::from_tag("en-US"), Some(Locale::En));
            assert_eq!(Locale::from_tag("es_MX"), Some(Locale::Es));
            assert_eq!(Locale::from_tag("ja-JP"), Some(Locale::Ja));
            assert_eq!(Locale::from_tag("fr"), None);
            assert_eq!(Locale::from_tag(""), None);
        }

        #[test]
        fn test_locale_default() {
            assert_eq!(Locale::default(), Locale::En);
        }
    }

    mod status {
        use super::*;

        #[test]
        fn test_status_db_roundtrip() {
            for status in [LinkStatus::Pending, LinkStatus::Verified, LinkStatus::Expired] {
                assert_eq!(LinkStatus::from_db(status.as_str()), Some(status));
            }
            assert_eq!(LinkStatus::from_db("unknown"), None);
        }

        #[test]
        fn test_method_db_roundtrip() {
            assert_eq!(
                VerificationMethod::from_db(VerificationMethod::EmailCode.as_str()),
                Some(VerificationMethod::EmailCode)
            );
            assert_eq!(VerificationMethod::from_db("sms"), None);
        }
    }
}
