//! Router assembly

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Build the read API router with tracing and permissive CORS
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/status", get(handlers::status))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/leaderboard/snapshots/:label", get(handlers::snapshot))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(CorsLayer::permissive())
}
