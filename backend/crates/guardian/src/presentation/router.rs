//! Guardian Router

use axum::{Router, middleware, routing::post};
use std::sync::Arc;

use crate::application::config::GuardianConfig;
use crate::domain::repository::{
    AccountRepository, AnalyticsRepository, GuardianLinkRepository, VerificationMailer,
};
use crate::infra::email::SmtpMailer;
use crate::infra::postgres::PgGuardianRepository;
use crate::presentation::handlers::{self, GuardianAppState};
use crate::presentation::middleware::require_child_session;

/// Create the guardian router with the PostgreSQL repository and SMTP mailer
pub fn guardian_router(
    repo: PgGuardianRepository,
    mailer: SmtpMailer,
    config: GuardianConfig,
) -> Router {
    guardian_router_generic(repo, mailer, config)
}

/// Create a generic guardian router for any repository/mailer implementation
pub fn guardian_router_generic<R, M>(repo: R, mailer: M, config: GuardianConfig) -> Router
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
    let config = Arc::new(config);
    let state = GuardianAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };

    Router::new()
        .route("/guardian-start", post(handlers::start_verification::<R, M>))
        .route("/guardian-verify", post(handlers::verify_code::<R, M>))
        .route_layer(middleware::from_fn_with_state(config, require_child_session))
        .with_state(state)
}
