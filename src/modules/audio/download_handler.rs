use crate::common::error::AppError;
use crate::common::response::ErrorResponse;
use crate::infrastructure::storage::local::StorageError;
use crate::modules::jobs::{JobLease, JobRecord};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, response::Builder, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::info;
use uuid::Uuid;

/// Download a trimmed file. Each link works once: the files are deleted
/// as soon as the response body is finished or abandoned.
#[utoipa::path(
    get,
    path = "/download/{file_id}",
    params(
        ("file_id" = String, Path, description = "Identity returned by /trim_audio")
    ),
    responses(
        (status = 200, description = "The trimmed audio file", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Unknown, expired or already downloaded", body = ErrorResponse)
    ),
    tag = "Audio"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    match stream_job(&state, &file_id).await {
        Ok(res) => res,
        Err(e) => e.into_response(),
    }
}

/// Report what a download would deliver without consuming the link, so
/// `HEAD` requests from link previewers leave the job in place.
pub async fn head_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    match describe_job(&state, &file_id).await {
        Ok(res) => res,
        Err(e) => e.into_response(),
    }
}

fn parse_file_id(file_id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(file_id).map_err(|_| AppError::NotFound)
}

fn response_headers(record: &JobRecord, content_length: Option<u64>) -> Builder {
    let content_type = mime_guess::from_path(&record.output_path)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!("attachment; filename=\"{}\"", record.output_file_name());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition);

    if let Some(len) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }
    builder
}

async fn describe_job(state: &AppState, file_id: &str) -> Result<Response, AppError> {
    let id = parse_file_id(file_id)?;
    let record = state.jobs.peek(&id).ok_or(AppError::NotFound)?;

    let content_length = match tokio::fs::metadata(&record.output_path).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(StorageError::Io(e).into()),
    };

    Ok(response_headers(&record, Some(content_length))
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

async fn stream_job(state: &AppState, file_id: &str) -> Result<Response, AppError> {
    let id = parse_file_id(file_id)?;
    let record = state.jobs.take(&id).ok_or(AppError::NotFound)?;

    // From here on the lease owns the files; any early return deletes them.
    let lease = JobLease::new(state.storage.clone(), record);
    let output = lease.record().output_path.clone();

    let file = match tokio::fs::File::open(&output).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(StorageError::Io(e).into()),
    };
    let content_length = file.metadata().await.map(|m| m.len()).ok();
    let builder = response_headers(lease.record(), content_length);

    info!(file_id = %id, "⬇️ Serving {}", output.display());

    // The lease rides along with the stream and drops with the body.
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _lease = &lease;
        chunk
    });

    Ok(builder
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
