//! Optional API-key auth for the protected surfaces.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uplink_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Require `X-Api-Key` when a key is configured; pass everything through
/// when not (development mode).
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let Some(expected) = state.config.api_key() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing API key".to_string()))?;

    // Constant-time comparison; a length mismatch short-circuits, which
    // leaks nothing useful about the key's content.
    if presented.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(next.run(request).await)
    } else {
        Err(HttpAppError(AppError::Unauthorized(
            "Invalid API key".to_string(),
        )))
    }
}
