//! Inbound request and outbound response types for the upload surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::pending::ConfirmOutcome;

/// Request to obtain a direct, resumable upload destination.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct InitiateUploadRequest {
    /// Size of the file to upload, in bytes
    #[validate(range(min = 1, message = "size_bytes must be at least 1"))]
    pub size_bytes: u64,
    /// Display name for the video on the host
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "display_name must be between 1 and 255 characters"
    ))]
    pub display_name: Option<String>,
}

/// Response containing the upload destination and the confirmation token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InitiateUploadResponse {
    /// Direct resumable upload URL on the video host
    pub upload_link: String,
    /// Identifier the host assigned to the placeholder object
    pub media_id: String,
    /// Capability the client must present when confirming completion
    pub token: String,
    /// Whether the abandonment safety net was registered. When false the
    /// upload link is still usable, but an abandoned upload will only be
    /// reclaimed by the host-side record's TTL.
    pub safety_net_registered: bool,
}

/// Request to confirm that an upload completed.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmUploadRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "media_id is required"))]
    pub media_id: String,
    /// Defaults to the current time when absent
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Reason a confirmation did not retire a pending record. These are data
/// outcomes, not transport errors: the surface still answers 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmFailureReason {
    NotFound,
    MediaMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmUploadResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConfirmFailureReason>,
}

impl From<ConfirmOutcome> for ConfirmUploadResponse {
    fn from(outcome: ConfirmOutcome) -> Self {
        match outcome {
            ConfirmOutcome::Confirmed => Self {
                ok: true,
                reason: None,
            },
            ConfirmOutcome::NotFound => Self {
                ok: false,
                reason: Some(ConfirmFailureReason::NotFound),
            },
            ConfirmOutcome::MediaMismatch => Self {
                ok: false,
                reason: Some(ConfirmFailureReason::MediaMismatch),
            },
        }
    }
}

/// Request to run one sweep of stale pending uploads.
///
/// `stale_minutes` is preferred; `stale_hours` is kept as a legacy fallback
/// and loses when both are present. Absent values fall back to the
/// operator-configured defaults.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SweepRequest {
    #[serde(default)]
    pub stale_minutes: Option<i64>,
    #[serde(default)]
    pub stale_hours: Option<i64>,
    #[serde(default)]
    pub limit: Option<usize>,
}
