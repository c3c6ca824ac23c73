//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use kernel::id::{AccountId, ChildId};

use crate::domain::entities::{Account, AnalyticsEvent, ChildProfile, CodeIssue, GuardianLink};
use crate::domain::repository::{
    AccountRepository, AnalyticsRepository, GuardianLinkRepository, VerificationOutcome,
};
use crate::domain::value_objects::{Email, LinkStatus, VerificationMethod};
use crate::error::{GuardianError, GuardianResult};

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgGuardianRepository {
    pool: PgPool,
}

impl PgGuardianRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sweep pending links whose code already expired into `expired`
    ///
    /// Expiry is otherwise checked lazily at verify time; this keeps the
    /// table honest across restarts.
    pub async fn expire_stale_codes(&self) -> GuardianResult<u64> {
        let expired = sqlx::query(
            "UPDATE guardian_links SET status = 'expired' \
             WHERE status = 'pending' AND code_expires_at <= NOW()",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(links = expired, "Expired stale guardian codes");

        Ok(expired)
    }
}

impl GuardianLinkRepository for PgGuardianRepository {
    async fn find(
        &self,
        child_id: &ChildId,
        guardian_email: &Email,
    ) -> GuardianResult<Option<GuardianLink>> {
        let row = sqlx::query_as::<_, GuardianLinkRow>(
            r#"
            SELECT child_id, guardian_email, method, status, code_hash,
                   code_expires_at, last_sent_at, attempts,
                   attempts_window_started_at, created_at, verified_at
            FROM guardian_links
            WHERE child_id = $1 AND guardian_email = $2
            "#,
        )
        .bind(child_id.as_uuid())
        .bind(guardian_email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(GuardianLinkRow::into_link).transpose()
    }

    async fn issue_code(&self, issue: &CodeIssue) -> GuardianResult<GuardianLink> {
        // The attempt counter and its window anchor move atomically with
        // the new digest; a window anchor at or before the cutoff starts
        // a fresh window.
        let row = sqlx::query_as::<_, GuardianLinkRow>(
            r#"
            INSERT INTO guardian_links (
                child_id, guardian_email, method, status, code_hash,
                code_expires_at, last_sent_at, attempts,
                attempts_window_started_at, created_at
            ) VALUES ($1, $2, 'email_code', 'pending', $3, $4, $5, 1, $5, $5)
            ON CONFLICT (child_id, guardian_email) DO UPDATE SET
                status = 'pending',
                code_hash = EXCLUDED.code_hash,
                code_expires_at = EXCLUDED.code_expires_at,
                last_sent_at = EXCLUDED.last_sent_at,
                attempts = CASE
                    WHEN guardian_links.attempts_window_started_at <= $6 THEN 1
                    ELSE guardian_links.attempts + 1
                END,
                attempts_window_started_at = CASE
                    WHEN guardian_links.attempts_window_started_at <= $6
                        THEN EXCLUDED.attempts_window_started_at
                    ELSE guardian_links.attempts_window_started_at
                END
            RETURNING child_id, guardian_email, method, status, code_hash,
                      code_expires_at, last_sent_at, attempts,
                      attempts_window_started_at, created_at, verified_at
            "#,
        )
        .bind(issue.child_id.as_uuid())
        .bind(issue.guardian_email.as_str())
        .bind(&issue.code_hash)
        .bind(issue.code_expires_at)
        .bind(issue.sent_at)
        .bind(issue.window_cutoff)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            child_id = %issue.child_id,
            "Guardian link upserted with fresh code"
        );

        row.into_link()
    }

    async fn mark_expired(
        &self,
        child_id: &ChildId,
        guardian_email: &Email,
    ) -> GuardianResult<()> {
        sqlx::query(
            "UPDATE guardian_links SET status = 'expired' \
             WHERE child_id = $1 AND guardian_email = $2 AND status = 'pending'",
        )
        .bind(child_id.as_uuid())
        .bind(guardian_email.as_str())
        .execute(&self.pool)
        .await?;

        tracing::info!(child_id = %child_id, "Guardian code marked expired");

        Ok(())
    }

    async fn complete_verification(
        &self,
        child_id: &ChildId,
        guardian_email: &Email,
        guardian_account_id: &AccountId,
        verified_at: DateTime<Utc>,
    ) -> GuardianResult<VerificationOutcome> {
        let mut tx = self.pool.begin().await?;

        // Conditional flip: only one of any number of concurrent verifies
        // can move the row out of `pending`.
        let flipped = sqlx::query(
            "UPDATE guardian_links SET status = 'verified', verified_at = $3 \
             WHERE child_id = $1 AND guardian_email = $2 AND status = 'pending'",
        )
        .bind(child_id.as_uuid())
        .bind(guardian_email.as_str())
        .bind(verified_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flipped == 0 {
            let status = sqlx::query_scalar::<_, String>(
                "SELECT status FROM guardian_links WHERE child_id = $1 AND guardian_email = $2",
            )
            .bind(child_id.as_uuid())
            .bind(guardian_email.as_str())
            .fetch_optional(&mut *tx)
            .await?;

            tx.rollback().await?;

            return Ok(match status.as_deref() {
                Some("verified") => VerificationOutcome::AlreadyVerified,
                _ => VerificationOutcome::NoPendingRequest,
            });
        }

        let profile_updated = sqlx::query(
            "UPDATE child_profiles SET guardian_account_id = $2, guardian_linked_at = $3 \
             WHERE child_id = $1",
        )
        .bind(child_id.as_uuid())
        .bind(guardian_account_id.as_uuid())
        .bind(verified_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if profile_updated == 0 {
            // Roll the flip back rather than leave a verified link with no
            // actual profile reference.
            tx.rollback().await?;
            return Err(GuardianError::Internal(format!(
                "child profile missing for {child_id}"
            )));
        }

        sqlx::query(
            "INSERT INTO guardian_audit_log (audit_id, actor, action, target_id, outcome, created_at) \
             VALUES ($1, 'system', 'guardian_verified', $2, 'approved', $3)",
        )
        .bind(Uuid::new_v4())
        .bind(child_id.as_uuid())
        .bind(verified_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(child_id = %child_id, "Guardian link verified and profile updated");

        Ok(VerificationOutcome::Completed)
    }
}

impl AccountRepository for PgGuardianRepository {
    async fn find_account_by_email(&self, email: &Email) -> GuardianResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, email, display_name, locale, is_parent_capable, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccountRow::into_account))
    }

    async fn find_child_profile(
        &self,
        child_id: &ChildId,
    ) -> GuardianResult<Option<ChildProfile>> {
        let row = sqlx::query_as::<_, ChildProfileRow>(
            r#"
            SELECT child_id, display_name, locale, guardian_account_id, guardian_linked_at
            FROM child_profiles
            WHERE child_id = $1
            "#,
        )
        .bind(child_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ChildProfileRow::into_profile))
    }
}

impl AnalyticsRepository for PgGuardianRepository {
    async fn record_event(&self, event: &AnalyticsEvent) -> GuardianResult<()> {
        sqlx::query(
            "INSERT INTO analytics_events (event_id, event_name, actor_id, properties) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(&event.event_name)
        .bind(event.actor_id)
        .bind(&event.properties)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct GuardianLinkRow {
    child_id: Uuid,
    guardian_email: String,
    method: String,
    status: String,
    code_hash: Vec<u8>,
    code_expires_at: DateTime<Utc>,
    last_sent_at: DateTime<Utc>,
    attempts: i32,
    attempts_window_started_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
}

impl GuardianLinkRow {
    fn into_link(self) -> GuardianResult<GuardianLink> {
        let status = LinkStatus::from_db(&self.status).ok_or_else(|| {
            GuardianError::Internal(format!("unknown link status '{}'", self.status))
        })?;
        let method = VerificationMethod::from_db(&self.method).ok_or_else(|| {
            GuardianError::Internal(format!("unknown verification method '{}'", self.method))
        })?;

        Ok(GuardianLink {
            child_id: ChildId::from_uuid(self.child_id),
            guardian_email: Email::from_db(self.guardian_email),
            method,
            status,
            code_hash: self.code_hash,
            code_expires_at: self.code_expires_at,
            last_sent_at: self.last_sent_at,
            attempts: self.attempts,
            attempts_window_started_at: self.attempts_window_started_at,
            created_at: self.created_at,
            verified_at: self.verified_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    display_name: Option<String>,
    locale: Option<String>,
    is_parent_capable: bool,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            display_name: self.display_name,
            locale: self.locale,
            is_parent_capable: self.is_parent_capable,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChildProfileRow {
    child_id: Uuid,
    display_name: Option<String>,
    locale: Option<String>,
    guardian_account_id: Option<Uuid>,
    guardian_linked_at: Option<DateTime<Utc>>,
}

impl ChildProfileRow {
    fn into_profile(self) -> ChildProfile {
        ChildProfile {
            child_id: ChildId::from_uuid(self.child_id),
            display_name: self.display_name,
            locale: self.locale,
            guardian_account_id: self.guardian_account_id.map(AccountId::from_uuid),
            guardian_linked_at: self.guardian_linked_at,
        }
    }
}
