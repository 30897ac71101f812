//! Sweep trigger handler.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use uplink_core::models::{SweepReport, SweepRequest};
use uplink_core::AppError;

/// Run one sweep of stale pending uploads
///
/// The staleness threshold is given in minutes (`stale_minutes`), with
/// `stale_hours` kept as a legacy fallback. Omitted parameters fall back to
/// the operator-configured defaults.
#[utoipa::path(
    post,
    path = "/api/v0/uploads/sweep",
    tag = "sweep",
    request_body = SweepRequest,
    responses(
        (status = 200, description = "Sweep completed", body = SweepReport),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "sweep"))]
pub async fn trigger_sweep(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SweepRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stale_minutes = match (request.stale_minutes, request.stale_hours) {
        (Some(minutes), _) => minutes,
        (None, Some(hours)) => hours.saturating_mul(60),
        (None, None) => state.config.sweep_stale_minutes(),
    };
    if stale_minutes <= 0 {
        return Err(HttpAppError(AppError::InvalidInput(
            "staleness threshold must be positive".to_string(),
        )));
    }

    let limit = request.limit.unwrap_or(state.config.sweep_batch_limit());
    if limit == 0 {
        return Err(HttpAppError(AppError::InvalidInput(
            "limit must be positive".to_string(),
        )));
    }

    // `TimeDelta::minutes` panics out of range; reject absurd thresholds as
    // input errors instead.
    let cutoff = TimeDelta::try_minutes(stale_minutes)
        .and_then(|delta| Utc::now().checked_sub_signed(delta))
        .ok_or_else(|| {
            HttpAppError(AppError::InvalidInput(
                "staleness threshold is out of range".to_string(),
            ))
        })?;
    let report = state.sweeper.sweep(cutoff, limit).await?;

    Ok(Json(report))
}
