use serde::{Deserialize, Serialize};

use crate::models::Profile;

// ==================== REQUEST DTOs ====================

/// Body of `POST /ingest`. Missing string fields deserialize to empty and
/// fail validation with a message, rather than a bare 422.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    #[serde(default)]
    pub profile_id: String,
    #[serde(default)]
    pub name: String,
    pub locale: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Body of `POST /seed`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    #[serde(default)]
    pub profile_id: String,
    #[serde(default)]
    pub name: String,
    pub locale: Option<String>,
    #[serde(default)]
    pub content: String,
}

// ==================== RESPONSE DTOs ====================

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub profiles: usize,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
