//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or
/// "{prefix}: {error}".
async fn run_check<F, T, E>(f: F, error_prefix: &str) -> (bool, String)
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(CHECK_TIMEOUT, f).await {
        Ok(Ok(_)) => (true, "healthy".to_string()),
        Ok(Err(e)) => (false, format!("{}: {}", error_prefix, e)),
        Err(_) => (false, "timeout".to_string()),
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - store connectivity and host credential.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (store_ok, store_status) = run_check(state.store.ping(), "store error").await;
    let (host_ok, host_status) = run_check(state.host.whoami(), "host error").await;

    let ready = store_ok && host_ok;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "store": store_status,
            "host": host_status,
        })),
    )
}
