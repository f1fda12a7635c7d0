//! HTTP API routes

pub mod ideas;
pub mod posts;
pub mod underlines;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/posts", posts::router())
        .nest("/api/ideas", ideas::router())
        .nest("/api/underlines", underlines::router())
        .with_state(state)
}

/// Format a stored RFC 3339 timestamp as a human-readable publish date
/// ("January 02, 2026"), falling back to the raw string if it does not parse.
pub(crate) fn publish_date(rfc3339: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(rfc3339) {
        Ok(dt) => dt.format("%B %d, %Y").to_string(),
        Err(_) => rfc3339.to_string(),
    }
}
