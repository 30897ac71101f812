//! Initiate and confirm handlers.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use uplink_core::models::{
    ConfirmUploadRequest, ConfirmUploadResponse, InitiateUploadRequest, InitiateUploadResponse,
};
use validator::Validate;

/// Obtain a direct, resumable upload destination from the video host
#[utoipa::path(
    post,
    path = "/api/v0/uploads",
    tag = "uploads",
    request_body = InitiateUploadRequest,
    responses(
        (status = 200, description = "Upload destination created", body = InitiateUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 502, description = "Video host rejected the request", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(size_bytes = request.size_bytes, operation = "initiate_upload")
)]
pub async fn initiate_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<InitiateUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let outcome = state
        .initiator
        .initiate(request.size_bytes, request.display_name.as_deref())
        .await?;

    Ok(Json(outcome))
}

/// Confirm that an upload completed
///
/// Always answers 200 once the input validates; `NOT_FOUND` and
/// `MEDIA_MISMATCH` are data-level outcomes carried in the body, not
/// transport errors. Confirmation is durable even when the pending record
/// already expired.
#[utoipa::path(
    post,
    path = "/api/v0/uploads/confirm",
    tag = "uploads",
    request_body = ConfirmUploadRequest,
    responses(
        (status = 200, description = "Confirmation processed", body = ConfirmUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(media_id = %request.media_id, operation = "confirm_upload")
)]
pub async fn confirm_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ConfirmUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let outcome = state
        .confirmation
        .confirm(&request.token, &request.media_id, request.confirmed_at)
        .await?;

    Ok(Json(ConfirmUploadResponse::from(outcome)))
}
