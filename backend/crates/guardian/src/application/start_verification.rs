//! Start Verification Use Case
//!
//! Issues a one-time code for a (child, guardian email) pair and emails it
//! to the guardian, subject to throttling.

use std::sync::Arc;

use chrono::Utc;

use kernel::id::ChildId;

use crate::application::config::GuardianConfig;
use crate::domain::entities::{AnalyticsEvent, CodeIssue};
use crate::domain::repository::{
    AccountRepository, AnalyticsRepository, CodeEmail, GuardianLinkRepository, VerificationMailer,
};
use crate::domain::services::{generate_code, hash_code};
use crate::domain::value_objects::{DisplayName, Email, LinkStatus, Locale};
use crate::error::{GuardianError, GuardianResult};

/// Input DTO for start verification
#[derive(Debug, Clone)]
pub struct StartVerificationInput {
    pub child_id: ChildId,
    pub guardian_email: String,
    pub child_name: Option<String>,
}

/// Output DTO for start verification
#[derive(Debug, Clone)]
pub struct StartVerificationOutput {
    /// Code validity window, never the code itself
    pub expires_in_secs: u64,
}

/// Start Verification Use Case
pub struct StartVerificationUseCase<L, A, E, M>
where
    L: GuardianLinkRepository,
    A: AccountRepository,
    E: AnalyticsRepository,
    M: VerificationMailer,
{
    link_repo: Arc<L>,
    account_repo: Arc<A>,
    analytics_repo: Arc<E>,
    mailer: Arc<M>,
    config: Arc<GuardianConfig>,
}

impl<L, A, E, M> StartVerificationUseCase<L, A, E, M>
where
    L: GuardianLinkRepository,
    A: AccountRepository,
    E: AnalyticsRepository,
    M: VerificationMailer,
{
    pub fn new(
        link_repo: Arc<L>,
        account_repo: Arc<A>,
        analytics_repo: Arc<E>,
        mailer: Arc<M>,
        config: Arc<GuardianConfig>,
    ) -> Self {
        Self {
            link_repo,
            account_repo,
            analytics_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: StartVerificationInput,
    ) -> GuardianResult<StartVerificationOutput> {
        // Validation happens before any throttle or storage access
        let guardian_email = Email::new(&input.guardian_email)?;
        let child_name = input
            .child_name
            .as_deref()
            .map(DisplayName::new)
            .transpose()?;

        let now = Utc::now();

        if let Some(link) = self.link_repo.find(&input.child_id, &guardian_email).await? {
            // A verified pair stays verified; never re-arm it
            if link.status == LinkStatus::Verified {
                return Err(GuardianError::AlreadyLinked);
            }

            // The cooldown is checked before the attempt counter moves
            let since_last_send = (now - link.last_sent_at).num_milliseconds();
            if let Some(retry_after_secs) =
                self.config.throttle.cooldown_remaining_secs(since_last_send)
            {
                return Err(GuardianError::ResendCooldown { retry_after_secs });
            }

            let window_age = (now - link.attempts_window_started_at).num_milliseconds();
            if !self.config.throttle.window_rolled(window_age)
                && self.config.throttle.cap_reached(link.attempts.max(0) as u32)
            {
                return Err(GuardianError::DailyCapReached);
            }
        }

        let code = generate_code();
        let code_hash = hash_code(&self.config.code_secret, &code);

        let issue = CodeIssue {
            child_id: input.child_id,
            guardian_email: guardian_email.clone(),
            code_hash: code_hash.to_vec(),
            code_expires_at: now + self.config.code_ttl_chrono(),
            sent_at: now,
            window_cutoff: now - self.config.window_chrono(),
        };
        let link = self.link_repo.issue_code(&issue).await?;

        tracing::info!(
            child_id = %input.child_id,
            attempts = link.attempts,
            "Guardian verification code issued"
        );

        // Personalization: the child profile supplies the locale and a
        // display-name fallback
        let profile = self.account_repo.find_child_profile(&input.child_id).await?;
        let locale = profile
            .as_ref()
            .and_then(|p| p.locale.as_deref())
            .and_then(Locale::from_tag)
            .unwrap_or(self.config.default_locale);
        let child_name = child_name
            .map(DisplayName::into_inner)
            .or_else(|| profile.and_then(|p| p.display_name));

        // The row is already committed: the code counts as issued even if
        // delivery fails, and the delivery failure surfaces to the caller.
        self.mailer
            .send_code(&CodeEmail {
                to: guardian_email.clone(),
                child_name,
                code,
                valid_for: self.config.code_ttl,
                locale,
            })
            .await?;

        // Best-effort: an analytics hiccup never fails the call
        let event = AnalyticsEvent::code_issued(&input.child_id, guardian_email.domain());
        if let Err(err) = self.analytics_repo.record_event(&event).await {
            tracing::warn!(error = %err, "Failed to record code issuance event");
        }

        Ok(StartVerificationOutput {
            expires_in_secs: self.config.code_ttl_secs(),
        })
    }
}
