use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod download_handler;
pub mod dto;
pub mod handler;
pub mod service;

pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route(
            "/download/{file_id}",
            get(download_handler::download_file).head(download_handler::head_file),
        );

    let protected_routes = Router::new()
        .route("/get_duration", post(handler::get_duration))
        .route("/trim_audio", post(handler::trim_audio))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::api_key::api_key_middleware,
        ));

    public_routes.merge(protected_routes)
}
