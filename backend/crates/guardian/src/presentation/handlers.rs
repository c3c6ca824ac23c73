//! HTTP Handlers

use axum::extract::{Extension, State};
use axum::Json;
use std::sync::Arc;

use crate::application::config::GuardianConfig;
use crate::application::start_verification::{StartVerificationInput, StartVerificationUseCase};
use crate::application::verify_code::{VerifyCodeInput, VerifyCodeUseCase};
use crate::domain::repository::{
    AccountRepository, AnalyticsRepository, GuardianLinkRepository, VerificationMailer,
};
use crate::error::GuardianResult;
use crate::presentation::dto::{StartRequest, StartResponse, VerifyRequest, VerifyResponse};
use crate::presentation::middleware::AuthenticatedChild;

/// Shared state for guardian handlers
pub struct GuardianAppState<R, M>
where
    R: GuardianLinkRepository
        + AccountRepository
        + AnalyticsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<GuardianConfig>,
}

impl<R, M> Clone for GuardianAppState<R, M>
where
    R: GuardianLinkRepository
        + AccountRepository
        + AnalyticsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
        }
    }
}

/// POST /api/guardian-start
pub async fn start_verification<R, M>(
    State(state): State<GuardianAppState<R, M>>,
    Extension(AuthenticatedChild(child_id)): Extension<AuthenticatedChild>,
    Json(req): Json<StartRequest>,
) -> GuardianResult<Json<StartResponse>>
where
    R: GuardianLinkRepository
        + AccountRepository
        + AnalyticsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let use_case = StartVerificationUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(StartVerificationInput {
            child_id,
            guardian_email: req.guardian_email,
            child_name: req.child_name,
        })
        .await?;

    Ok(Json(StartResponse {
        success: true,
        message: "Verification code sent to the guardian's email".to_string(),
        expires_in: output.expires_in_secs,
    }))
}

/// POST /api/guardian-verify
pub async fn verify_code<R, M>(
    State(state): State<GuardianAppState<R, M>>,
    Extension(AuthenticatedChild(child_id)): Extension<AuthenticatedChild>,
    Json(req): Json<VerifyRequest>,
) -> GuardianResult<Json<VerifyResponse>>
where
    R: GuardianLinkRepository
        + AccountRepository
        + AnalyticsRepository
        + Clone
        + Send
        + Sync
        + 'static,
    M: VerificationMailer + Send + Sync + 'static,
{
    let use_case = VerifyCodeUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(VerifyCodeInput {
            child_id,
            guardian_email: req.guardian_email,
            code: req.code,
        })
        .await?;

    let message = if output.already_verified {
        "Guardian already verified"
    } else {
        "Guardian verified"
    };

    Ok(Json(VerifyResponse {
        success: true,
        message: message.to_string(),
        verified: output.verified,
    }))
}
