//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

/// Request for POST /api/guardian-start
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub guardian_email: String,
    #[serde(default)]
    pub child_name: Option<String>,
}

/// Response for POST /api/guardian-start
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    /// Code validity window in seconds
    pub expires_in: u64,
}

/// Request for POST /api/guardian-verify
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub guardian_email: String,
    pub code: String,
}

/// Response for POST /api/guardian-verify
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub verified: bool,
}
