use super::dto::{DurationResponse, TrimResponse};
use super::service::AudioService;
use crate::common::response::{ApiSuccess, ErrorResponse};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};

/// Report the duration of an uploaded MP3 or WAV file.
/// The upload is deleted before the response is sent.
#[utoipa::path(
    post,
    path = "/get_duration",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Duration in seconds", body = DurationResponse),
        (status = 400, description = "Missing or unsupported file", body = ErrorResponse),
        (status = 401, description = "Invalid API key", body = ErrorResponse),
        (status = 500, description = "Could not read the audio", body = ErrorResponse)
    ),
    tag = "Audio",
    security(("api_key" = []))
)]
pub async fn get_duration(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    match AudioService::duration(state, multipart).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Trim an uploaded file to `duration` seconds.
/// Returns a one-time download link for the result.
#[utoipa::path(
    post,
    path = "/trim_audio",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Trimmed file ready", body = TrimResponse),
        (status = 400, description = "Missing file, unsupported type or bad duration", body = ErrorResponse),
        (status = 401, description = "Invalid API key", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Trimming failed", body = ErrorResponse)
    ),
    tag = "Audio",
    security(("api_key" = []))
)]
pub async fn trim_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    match AudioService::trim(state, multipart).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}
