//! Repository Traits
//!
//! Interfaces for persistence and outbound delivery. Implementations are in
//! the infrastructure layer.

use chrono::{DateTime, Utc};
use std::time::Duration;

use kernel::id::{AccountId, ChildId};

use crate::domain::entities::{Account, AnalyticsEvent, ChildProfile, CodeIssue, GuardianLink};
use crate::domain::value_objects::{Email, Locale, VerificationCode};
use crate::error::GuardianResult;

/// Outcome of the conditional `pending -> verified` transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// This call won the transition; profile link and audit row committed
    Completed,
    /// The link was already verified (idempotent replay or a lost race)
    AlreadyVerified,
    /// No pending link remained to verify
    NoPendingRequest,
}

/// Guardian link repository trait
#[trait_variant::make(GuardianLinkRepository: Send)]
pub trait LocalGuardianLinkRepository {
    /// Load the link row for a (child, guardian email) pair
    async fn find(
        &self,
        child_id: &ChildId,
        guardian_email: &Email,
    ) -> GuardianResult<Option<GuardianLink>>;

    /// Upsert the pair's row with a fresh code digest and expiry,
    /// incrementing the windowed attempt counter atomically
    async fn issue_code(&self, issue: &CodeIssue) -> GuardianResult<GuardianLink>;

    /// Persist `pending -> expired` (no-op unless the row is pending)
    async fn mark_expired(
        &self,
        child_id: &ChildId,
        guardian_email: &Email,
    ) -> GuardianResult<()>;

    /// Atomically flip `pending -> verified`, point the child profile at the
    /// guardian account, and write the audit row, all in one transaction
    async fn complete_verification(
        &self,
        child_id: &ChildId,
        guardian_email: &Email,
        guardian_account_id: &AccountId,
        verified_at: DateTime<Utc>,
    ) -> GuardianResult<VerificationOutcome>;
}

/// Account / child-profile repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Find a registered account by normalized email
    async fn find_account_by_email(&self, email: &Email) -> GuardianResult<Option<Account>>;

    /// Load a child profile (display name, locale, guardian reference)
    async fn find_child_profile(&self, child_id: &ChildId)
    -> GuardianResult<Option<ChildProfile>>;
}

/// Analytics sink trait
#[trait_variant::make(AnalyticsRepository: Send)]
pub trait LocalAnalyticsRepository {
    /// Record a product analytics event
    async fn record_event(&self, event: &AnalyticsEvent) -> GuardianResult<()>;
}

/// Outbound verification-code email
#[derive(Debug, Clone)]
pub struct CodeEmail {
    pub to: Email,
    /// Child name for personalization; templates fall back per locale
    pub child_name: Option<String>,
    pub code: VerificationCode,
    pub valid_for: Duration,
    pub locale: Locale,
}

/// Verification mailer trait
#[trait_variant::make(VerificationMailer: Send)]
pub trait LocalVerificationMailer {
    /// Deliver the one-time code to the guardian's address
    async fn send_code(&self, email: &CodeEmail) -> GuardianResult<()>;
}
