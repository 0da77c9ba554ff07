use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DurationResponse {
    /// Playing time in seconds.
    pub duration: f64,
    /// Sanitized name the upload was stored under.
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrimResponse {
    pub message: String,
    pub download_url: String,
    pub file_id: Uuid,
}
