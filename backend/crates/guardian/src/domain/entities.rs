//! Domain Entities
//!
//! Core business entities for the guardian domain.

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, ChildId};
use uuid::Uuid;

use crate::domain::value_objects::{Email, LinkStatus, VerificationMethod};

/// GuardianLink entity - one verification lifecycle per (child, guardian
/// email) pair. Never hard-deleted by the flow; expiry is a status.
#[derive(Debug, Clone)]
pub struct GuardianLink {
    pub child_id: ChildId,
    pub guardian_email: Email,
    pub method: VerificationMethod,
    pub status: LinkStatus,
    /// Keyed digest of the current one-time code
    pub code_hash: Vec<u8>,
    pub code_expires_at: DateTime<Utc>,
    pub last_sent_at: DateTime<Utc>,
    /// Issuances inside the current rolling window
    pub attempts: i32,
    pub attempts_window_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl GuardianLink {
    /// The code is invalid at or after its expiry instant
    pub fn is_code_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.code_expires_at
    }

    pub fn is_verified(&self) -> bool {
        self.status == LinkStatus::Verified
    }
}

/// Parameters for issuing (or re-issuing) a code on a link row
#[derive(Debug, Clone)]
pub struct CodeIssue {
    pub child_id: ChildId,
    pub guardian_email: Email,
    pub code_hash: Vec<u8>,
    pub code_expires_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    /// Rows whose window anchor is at or before this instant start a new
    /// window with `attempts = 1`
    pub window_cutoff: DateTime<Utc>,
}

/// Registered account, as the guardian flow sees it
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    /// Whether the account may act as a parent/guardian
    pub is_parent_capable: bool,
    pub created_at: DateTime<Utc>,
}

/// Child profile: personalization source and target of the guardian link
#[derive(Debug, Clone)]
pub struct ChildProfile {
    pub child_id: ChildId,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    pub guardian_account_id: Option<AccountId>,
    pub guardian_linked_at: Option<DateTime<Utc>>,
}

/// Product analytics event, recorded best-effort
#[derive(Debug, Clone)]
pub struct AnalyticsEvent {
    pub event_name: String,
    pub actor_id: Uuid,
    pub properties: serde_json::Value,
}

impl AnalyticsEvent {
    /// Issuance event. Only the email's domain part is recorded.
    pub fn code_issued(child_id: &ChildId, guardian_email_domain: &str) -> Self {
        Self {
            event_name: "guardian_code_issued".to_string(),
            actor_id: *child_id.as_uuid(),
            properties: serde_json::json!({
                "guardianEmailDomain": guardian_email_domain,
                "method": "email_code",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_link(now: DateTime<Utc>) -> GuardianLink {
        GuardianLink {
            child_id: ChildId::new(),
            guardian_email: Email::from_db("guardian@example.com"),
            method: VerificationMethod::EmailCode,
            status: LinkStatus::Pending,
            code_hash: vec![0u8; 32],
            code_expires_at: now + Duration::minutes(15),
            last_sent_at: now,
            attempts: 1,
            attempts_window_started_at: now,
            created_at: now,
            verified_at: None,
        }
    }

    #[test]
    fn test_code_expiry_boundary() {
        let now = Utc::now();
        let link = sample_link(now);

        assert!(!link.is_code_expired(now));
        assert!(!link.is_code_expired(now + Duration::minutes(14)));
        // Invalid at the expiry instant itself
        assert!(link.is_code_expired(now + Duration::minutes(15)));
        assert!(link.is_code_expired(now + Duration::minutes(16)));
    }

    #[test]
    fn test_issuance_event_redacts_address() {
        let child_id = ChildId::new();
        let event = AnalyticsEvent::code_issued(&child_id, "example.com");

        assert_eq!(event.event_name, "guardian_code_issued");
        assert_eq!(event.actor_id, *child_id.as_uuid());
        assert_eq!(event.properties["guardianEmailDomain"], "example.com");
        assert!(!event.properties.to_string().contains('@'));
    }
}
