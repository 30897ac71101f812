//! Pending-upload lifecycle records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One outstanding upload slot: the host was told to prepare it, but we do
/// not yet know whether the user finished the upload.
///
/// Stored at `pending:<token>` with a safety-net TTL; the token doubles as
/// the capability a confirming client must present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    pub token: String,
    pub media_id: String,
    pub created_at: DateTime<Utc>,
}

impl PendingRecord {
    pub fn new(token: impl Into<String>, media_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            media_id: media_id.into(),
            created_at,
        }
    }

    /// Score used in the expiry index: creation time as unix milliseconds.
    pub fn score(&self) -> f64 {
        self.created_at.timestamp_millis() as f64
    }
}

/// Durable signal that a media object was confirmed completed by the user.
///
/// Keyed by media id, independent of any pending token, with its own
/// long-lived expiry so a confirmation that loses the race with the sweeper
/// (or arrives for a token that never existed) still prevents deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedMarker {
    pub media_id: String,
    /// Token presented at confirmation time, if any; diagnostic only.
    pub token: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}

/// Data-level result of a confirmation attempt. All three are successful at
/// the transport level; only `Confirmed` mutates the pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Record matched (or was already confirmed earlier) and is retired.
    Confirmed,
    /// No pending record and no prior marker for this media id.
    NotFound,
    /// A record exists for the token but names a different media id; nothing
    /// was deleted.
    MediaMismatch,
}
