use serde::{Deserialize, Serialize};
use crate::models::domain::User;

/// Response for the related profiles endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProfilesResponse {
    pub profiles: Vec<User>,
    pub total_results: usize,
}

/// Response for a recorded swipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub success: bool,
    pub history_len: Option<u64>,
}

/// Response for a subscription change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub user_id: i64,
    pub is_premium: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
