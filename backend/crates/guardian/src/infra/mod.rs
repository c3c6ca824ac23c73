//! Infrastructure Layer
//!
//! Concrete adapters for the domain's ports: PostgreSQL persistence and
//! SMTP email delivery.

pub mod email;
pub mod postgres;
