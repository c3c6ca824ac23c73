//! Guardian Error Types
//!
//! This module provides guardian-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Guardian-specific result type alias
pub type GuardianResult<T> = Result<T, GuardianError>;

/// Guardian-specific error variants
///
/// These are domain-specific errors that map to the product's client
/// contract and can be converted to `AppError` for unified error handling.
#[derive(Debug, Error)]
pub enum GuardianError {
    /// Caller has no valid bearer credential
    #[error("Authentication required")]
    NotAuthenticated,

    /// Malformed input (email, name, or code shape)
    #[error("Invalid request: {details}")]
    Validation { details: String },

    /// Resend requested before the cooldown elapsed
    #[error("Resend cooldown active: retry in {retry_after_secs}s")]
    ResendCooldown { retry_after_secs: u64 },

    /// Rolling-window issuance cap exhausted for this pair
    #[error("Daily verification code cap reached")]
    DailyCapReached,

    /// The pair is already verified; no new code may be issued
    #[error("Guardian already verified for this account")]
    AlreadyLinked,

    /// No verification request exists for the pair
    #[error("Verification request not found")]
    LinkNotFound,

    /// The one-time code is past its expiry
    #[error("Verification code has expired")]
    CodeExpired,

    /// Submitted code does not match the stored digest
    #[error("Invalid verification code")]
    InvalidCode,

    /// Guardian has no registered account, or it is not parent-capable
    #[error("Guardian account missing or not parent-capable")]
    GuardianAccountRequired,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Email provider error
    #[error("Email dispatch failed: {0}")]
    EmailDispatch(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuardianError {
    /// Get the HTTP status code for this error
    ///
    /// The client contract surfaces verification-state failures (not found,
    /// expired, mismatch, ineligible guardian) as 400s with stable `error`
    /// strings rather than spreading them across 404/409/410.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GuardianError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            GuardianError::Validation { .. }
            | GuardianError::AlreadyLinked
            | GuardianError::LinkNotFound
            | GuardianError::CodeExpired
            | GuardianError::InvalidCode
            | GuardianError::GuardianAccountRequired => StatusCode::BAD_REQUEST,
            GuardianError::ResendCooldown { .. } | GuardianError::DailyCapReached => {
                StatusCode::TOO_MANY_REQUESTS
            }
            GuardianError::Database(_)
            | GuardianError::EmailDispatch(_)
            | GuardianError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the semantic ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuardianError::NotAuthenticated => ErrorKind::Unauthorized,
            GuardianError::Validation { .. } => ErrorKind::BadRequest,
            GuardianError::ResendCooldown { .. } | GuardianError::DailyCapReached => {
                ErrorKind::TooManyRequests
            }
            GuardianError::AlreadyLinked | GuardianError::InvalidCode => ErrorKind::Conflict,
            GuardianError::LinkNotFound => ErrorKind::NotFound,
            GuardianError::CodeExpired => ErrorKind::Gone,
            GuardianError::GuardianAccountRequired => ErrorKind::UnprocessableEntity,
            GuardianError::EmailDispatch(_) => ErrorKind::ServiceUnavailable,
            GuardianError::Database(_) | GuardianError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable, display-ready message for the client
    ///
    /// Dependency failures collapse to one generic message; the real cause
    /// is logged server-side only. Expiry and mismatch may state the
    /// specific reason since neither reveals anything an attacker could not
    /// already infer.
    pub fn client_message(&self) -> String {
        match self {
            GuardianError::NotAuthenticated => "Authentication required".to_string(),
            GuardianError::Validation { .. } => "Invalid request".to_string(),
            GuardianError::ResendCooldown { retry_after_secs } => {
                format!("Please wait {retry_after_secs} seconds before requesting a new code")
            }
            GuardianError::DailyCapReached => {
                "Too many verification codes requested today. Try again later.".to_string()
            }
            GuardianError::AlreadyLinked => {
                "This guardian is already verified for the account".to_string()
            }
            GuardianError::LinkNotFound => "Verification request not found".to_string(),
            GuardianError::CodeExpired => {
                "The verification code has expired. Request a new one.".to_string()
            }
            GuardianError::InvalidCode => "Invalid verification code".to_string(),
            GuardianError::GuardianAccountRequired => {
                "Guardian account not found or not eligible for verification".to_string()
            }
            GuardianError::Database(_)
            | GuardianError::EmailDispatch(_)
            | GuardianError::Internal(_) => {
                "Something went wrong while processing the request".to_string()
            }
        }
    }

    /// Whether this failure belongs to the verification state machine,
    /// where the response body also carries `verified: false`
    fn is_verification_state(&self) -> bool {
        matches!(
            self,
            GuardianError::LinkNotFound
                | GuardianError::CodeExpired
                | GuardianError::InvalidCode
                | GuardianError::GuardianAccountRequired
        )
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GuardianError::Database(e) => {
                tracing::error!(error = %e, "Guardian storage error");
            }
            GuardianError::EmailDispatch(msg) => {
                tracing::error!(message = %msg, "Guardian email dispatch error");
            }
            GuardianError::Internal(msg) => {
                tracing::error!(message = %msg, "Guardian internal error");
            }
            GuardianError::InvalidCode => {
                tracing::warn!("Guardian code mismatch");
            }
            GuardianError::ResendCooldown { .. } | GuardianError::DailyCapReached => {
                tracing::warn!(error = %self, "Guardian issuance throttled");
            }
            _ => {
                tracing::debug!(error = %self, "Guardian flow error");
            }
        }
    }
}

impl From<GuardianError> for AppError {
    fn from(err: GuardianError) -> Self {
        let kind = err.kind();
        let message = err.client_message();
        AppError::new(kind, message)
    }
}

// Value objects are the only AppError source inside this crate, and they
// only ever fail validation.
impl From<AppError> for GuardianError {
    fn from(err: AppError) -> Self {
        GuardianError::Validation {
            details: err.message().to_string(),
        }
    }
}

impl IntoResponse for GuardianError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();

        let mut body = serde_json::json!({
            "ok": false,
            "error": self.client_message(),
        });
        if self.is_verification_state() {
            body["verified"] = serde_json::Value::Bool(false);
        }
        if let GuardianError::Validation { details } = &self {
            body["details"] = serde_json::Value::String(details.clone());
        }

        (status, Json(body)).into_response()
    }
}
