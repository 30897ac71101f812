//! Sweep report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of processing one scanned record during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SweepItemOutcome {
    /// Remote object deleted (or already gone) and the record retired.
    Deleted,
    /// A confirmed marker appeared between the scan and the delete; the
    /// record was retired without touching the remote object.
    SkippedConfirmed,
    /// Remote delete (or the retire that follows it) failed; the record is
    /// left in place and the next sweep retries it.
    DeleteFailed,
    /// The stored record could not be decoded. Left for the safety-net TTL.
    Malformed,
}

/// Per-item breakdown entry. One item's failure never aborts the batch, so
/// operators always get the full list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepItem {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    pub outcome: SweepItemOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one sweep invocation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepReport {
    /// Cutoff timestamp the scan used
    pub cutoff: DateTime<Utc>,
    /// Records the scan returned for processing
    pub found: usize,
    /// Records whose remote object is gone and which were retired
    pub deleted: usize,
    pub items: Vec<SweepItem>,
}
