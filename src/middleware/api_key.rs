use crate::common::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

pub const API_KEY_HEADER: &str = "X-API-KEY";

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Rejects the request before its body is read unless `X-API-KEY` matches.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let rejection = match req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(key) if secure_compare(key, &state.config.api_key) => None,
        Some(_) => Some("wrong API key"),
        None => Some("missing API key"),
    };

    match rejection {
        None => Ok(next.run(req).await),
        Some(reason) => {
            warn!(path = %req.uri().path(), "Rejected request: {}", reason);
            Err(AppError::Unauthorized)
        }
    }
}
