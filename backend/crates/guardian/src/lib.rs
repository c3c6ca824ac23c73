//! Guardian Verification Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database and SMTP implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Security Model
//! - One-time codes are 6 random digits drawn from the OS CSPRNG and stored
//!   only as keyed digests (HMAC-SHA256); plaintext never touches the store
//! - Digest comparison is constant-time over the full digest length
//! - Issuance is throttled per (child, guardian email) pair: 60 s resend
//!   cooldown plus a cap of 5 sends per rolling 24 h window
//! - The `pending -> verified` transition is a conditional update; the child
//!   profile link and the audit row commit in the same transaction

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::GuardianConfig;
pub use error::{GuardianError, GuardianResult};
pub use infra::email::{MailerConfig, SmtpMailer};
pub use infra::postgres::PgGuardianRepository;
pub use presentation::router::guardian_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod store {
    pub use crate::infra::postgres::PgGuardianRepository as GuardianStore;
}
