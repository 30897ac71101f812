//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use uplink_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Uplink API",
        version = "0.1.0",
        description = "Pending-upload lifecycle tracker: obtain a direct resumable upload \
                       destination on the video host, confirm completion, and sweep \
                       abandoned uploads. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::uploads::initiate_upload,
        handlers::uploads::confirm_upload,
        handlers::sweep::trigger_sweep,
    ),
    components(schemas(
        models::InitiateUploadRequest,
        models::InitiateUploadResponse,
        models::ConfirmUploadRequest,
        models::ConfirmUploadResponse,
        models::ConfirmFailureReason,
        models::SweepRequest,
        models::SweepReport,
        models::SweepItem,
        models::SweepItemOutcome,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload initiation and confirmation"),
        (name = "sweep", description = "Stale upload reclamation")
    )
)]
pub struct ApiDoc;
