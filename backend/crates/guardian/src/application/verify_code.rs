//! Verify Code Use Case
//!
//! Validates a submitted one-time code and, on success, permanently links
//! the child's profile to the guardian's account.

use std::sync::Arc;

use chrono::Utc;

use kernel::id::ChildId;

use crate::application::config::GuardianConfig;
use crate::domain::repository::{AccountRepository, GuardianLinkRepository, VerificationOutcome};
use crate::domain::services::code_matches;
use crate::domain::value_objects::{Email, LinkStatus, VerificationCode};
use crate::error::{GuardianError, GuardianResult};

/// Input DTO for verify code
#[derive(Debug, Clone)]
pub struct VerifyCodeInput {
    pub child_id: ChildId,
    pub guardian_email: String,
    pub code: String,
}

/// Output DTO for verify code
#[derive(Debug, Clone)]
pub struct VerifyCodeOutput {
    pub verified: bool,
    /// True when the pair was verified before this call (replay or a lost
    /// race); such calls have no side effects
    pub already_verified: bool,
}

/// Verify Code Use Case
pub struct VerifyCodeUseCase<L, A>
where
    L: GuardianLinkRepository,
    A: AccountRepository,
{
    link_repo: Arc<L>,
    account_repo: Arc<A>,
    config: Arc<GuardianConfig>,
}

impl<L, A> VerifyCodeUseCase<L, A>
where
    L: GuardianLinkRepository,
    A: AccountRepository,
{
    pub fn new(link_repo: Arc<L>, account_repo: Arc<A>, config: Arc<GuardianConfig>) -> Self {
        Self {
            link_repo,
            account_repo,
            config,
        }
    }

    pub async fn execute(&self, input: VerifyCodeInput) -> GuardianResult<VerifyCodeOutput> {
        // Both fields validate before any storage access
        let guardian_email = Email::new(&input.guardian_email)?;
        let code = VerificationCode::parse(&input.code)?;

        let link = self
            .link_repo
            .find(&input.child_id, &guardian_email)
            .await?
            .ok_or(GuardianError::LinkNotFound)?;

        // Replays against an already-verified pair succeed without
        // re-processing
        if link.status == LinkStatus::Verified {
            return Ok(VerifyCodeOutput {
                verified: true,
                already_verified: true,
            });
        }

        if link.status == LinkStatus::Expired {
            return Err(GuardianError::CodeExpired);
        }

        let now = Utc::now();
        if link.is_code_expired(now) {
            // The transition is persisted even though the call fails
            self.link_repo
                .mark_expired(&input.child_id, &guardian_email)
                .await?;
            return Err(GuardianError::CodeExpired);
        }

        if !code_matches(&self.config.code_secret, &code, &link.code_hash) {
            return Err(GuardianError::InvalidCode);
        }

        // Guardian resolution happens before any write: the row must never
        // read `verified` while the profile link is still missing.
        let account = self
            .account_repo
            .find_account_by_email(&guardian_email)
            .await?
            .ok_or(GuardianError::GuardianAccountRequired)?;
        if !account.is_parent_capable {
            return Err(GuardianError::GuardianAccountRequired);
        }

        match self
            .link_repo
            .complete_verification(&input.child_id, &guardian_email, &account.id, now)
            .await?
        {
            VerificationOutcome::Completed => {
                tracing::info!(
                    child_id = %input.child_id,
                    guardian_account_id = %account.id,
                    "Guardian verified and child profile linked"
                );
                Ok(VerifyCodeOutput {
                    verified: true,
                    already_verified: false,
                })
            }
            // A concurrent call won the flip; the result is the same
            VerificationOutcome::AlreadyVerified => Ok(VerifyCodeOutput {
                verified: true,
                already_verified: true,
            }),
            VerificationOutcome::NoPendingRequest => Err(GuardianError::LinkNotFound),
        }
    }
}
