//! Liveness endpoints.

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET /
///
/// Plain-text liveness message at the root, for load balancers and humans.
pub async fn api_root() -> impl IntoResponse {
    "API is running..."
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
