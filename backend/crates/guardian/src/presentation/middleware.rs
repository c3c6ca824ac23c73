//! Guardian Middleware
//!
//! Resolves the caller's bearer credential to a child identity before any
//! handler logic runs.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use kernel::id::ChildId;

use crate::application::config::GuardianConfig;
use crate::error::GuardianError;

/// Authenticated caller identity, inserted into request extensions
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedChild(pub ChildId);

/// Middleware that requires a valid child bearer token
///
/// Token format: `base64(child_uuid || hmac_sha256(secret, child_uuid))`,
/// verified in constant time.
pub async fn require_child_session(
    State(config): State<Arc<GuardianConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let child_id = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| platform::token::verify(&config.session_secret, token));

    match child_id {
        Some(id) => {
            req.extensions_mut()
                .insert(AuthenticatedChild(ChildId::from_uuid(id)));
            Ok(next.run(req).await)
        }
        None => {
            tracing::debug!("Rejected guardian call without a valid bearer token");
            Err(GuardianError::NotAuthenticated.into_response())
        }
    }
}
