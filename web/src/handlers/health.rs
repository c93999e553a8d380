//! Liveness endpoint.

use axum::http::StatusCode;

/// `GET /health`
///
/// Returns 200 `ok` while the process is serving. Does not touch the
/// database or the session backend.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
