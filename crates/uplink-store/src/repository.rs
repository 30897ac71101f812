//! Pending-record repository.
//!
//! Owns the three persisted structures and their consistency invariants:
//!
//! - `pending:<token>` — the pending record, with a safety-net TTL,
//! - `confirmed:<media_id>` — the durable confirmation marker,
//! - `pending-by-time` — the sorted expiry index (member = token,
//!   score = creation time in unix millis).
//!
//! Cross-key sequences are not atomic as a unit; partial completion is an
//! accepted failure mode bounded by the repair logic in `scan_expired`
//! (orphan pruning, confirmed-marker check) and by the safety-net TTL.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uplink_core::models::{ConfirmOutcome, ConfirmedMarker, PendingRecord};
use uplink_core::AppError;

use crate::kv::KvStore;

const PENDING_PREFIX: &str = "pending:";
const CONFIRMED_PREFIX: &str = "confirmed:";
pub const EXPIRY_INDEX: &str = "pending-by-time";

fn pending_key(token: &str) -> String {
    format!("{}{}", PENDING_PREFIX, token)
}

fn confirmed_key(media_id: &str) -> String {
    format!("{}{}", CONFIRMED_PREFIX, media_id)
}

/// One entry produced by [`PendingRepository::scan_expired`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiredEntry {
    Pending(PendingRecord),
    /// The record exists but could not be decoded. Reported for visibility
    /// and left in place for the safety-net TTL.
    Malformed { token: String },
}

#[derive(Clone)]
pub struct PendingRepository {
    store: Arc<dyn KvStore>,
    pending_ttl: Duration,
    confirmed_ttl: Duration,
}

impl PendingRepository {
    pub fn new(store: Arc<dyn KvStore>, pending_ttl: Duration, confirmed_ttl: Duration) -> Self {
        Self {
            store,
            pending_ttl,
            confirmed_ttl,
        }
    }

    /// Register a pending record and add it to the expiry index.
    ///
    /// The record write comes first; an index-write failure is logged and
    /// swallowed, leaving a record the sweeper cannot see but the safety-net
    /// TTL will eventually reclaim. The reverse ordering would leave an
    /// index entry with no record, which is strictly worse.
    pub async fn create(
        &self,
        token: &str,
        media_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let record = PendingRecord::new(token, media_id, created_at);
        let payload = serde_json::to_string(&record)?;

        self.store
            .set_with_ttl(&pending_key(token), &payload, self.pending_ttl)
            .await?;

        if let Err(e) = self.store.zadd(EXPIRY_INDEX, token, record.score()).await {
            warn!(
                token,
                media_id,
                error = %e,
                "Expiry index write failed; record will only be reclaimed by its TTL"
            );
        }

        Ok(())
    }

    pub async fn read(&self, token: &str) -> Result<Option<PendingRecord>, AppError> {
        match self.store.get(&pending_key(token)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Confirm an upload.
    ///
    /// The marker write is unconditional and happens first: confirmation
    /// must be durable even when the pending record already expired, was
    /// never created, or names a different media id. A repeat of an earlier
    /// confirmation reports `Confirmed` again; a different token naming an
    /// already-confirmed media id does not get that upgrade.
    pub async fn confirm(
        &self,
        token: &str,
        media_id: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<ConfirmOutcome, AppError> {
        let prior_marker = self.read_marker(media_id).await?;
        let repeat_confirmation = prior_marker
            .as_ref()
            .is_some_and(|m| m.token.as_deref() == Some(token));

        // A prior marker keeps its original token and timestamp; the write
        // only refreshes the TTL.
        let marker = prior_marker.unwrap_or_else(|| ConfirmedMarker {
            media_id: media_id.to_string(),
            token: Some(token.to_string()),
            confirmed_at,
        });
        self.store
            .set_with_ttl(
                &confirmed_key(media_id),
                &serde_json::to_string(&marker)?,
                self.confirmed_ttl,
            )
            .await?;

        let record = match self.store.get(&pending_key(token)).await? {
            None => {
                return Ok(if repeat_confirmation {
                    ConfirmOutcome::Confirmed
                } else {
                    ConfirmOutcome::NotFound
                });
            }
            Some(payload) => match serde_json::from_str::<PendingRecord>(&payload) {
                Ok(record) => record,
                Err(e) => {
                    // Cannot verify the media id against a record we cannot
                    // decode; the marker is written, which is what matters.
                    warn!(token, error = %e, "Undecodable pending record during confirm");
                    return Ok(if repeat_confirmation {
                        ConfirmOutcome::Confirmed
                    } else {
                        ConfirmOutcome::NotFound
                    });
                }
            },
        };

        if record.media_id != media_id {
            // A guessed token must not clear an unrelated record.
            return Ok(ConfirmOutcome::MediaMismatch);
        }

        self.retire(token).await?;
        Ok(ConfirmOutcome::Confirmed)
    }

    /// Scan the expiry index for records created at or before `cutoff`,
    /// oldest first, up to `limit`.
    ///
    /// Side effects per index entry:
    /// - no backing record: the orphan token is pruned from the index,
    /// - confirmed marker present for the record's media id: the record is
    ///   retired as already resolved,
    /// - undecodable record: reported as [`ExpiredEntry::Malformed`].
    ///
    /// A store failure on one token skips that token and continues; the next
    /// scan picks it up again.
    pub async fn scan_expired(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ExpiredEntry>, AppError> {
        let max_score = cutoff.timestamp_millis() as f64;
        let tokens = self
            .store
            .zrange_by_score(EXPIRY_INDEX, max_score, limit)
            .await?;

        let mut entries = Vec::with_capacity(tokens.len());
        for token in tokens {
            let payload = match self.store.get(&pending_key(&token)).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(%token, error = %e, "Record lookup failed during scan; skipping");
                    continue;
                }
            };

            let Some(payload) = payload else {
                // TTL reclaimed the record (or create never finished); heal
                // the index so it cannot grow without bound.
                debug!(%token, "Pruning orphan index entry");
                if let Err(e) = self.store.zrem(EXPIRY_INDEX, &token).await {
                    warn!(%token, error = %e, "Orphan prune failed; next scan retries");
                }
                continue;
            };

            let record = match serde_json::from_str::<PendingRecord>(&payload) {
                Ok(record) => record,
                Err(e) => {
                    warn!(%token, error = %e, "Undecodable pending record in scan");
                    entries.push(ExpiredEntry::Malformed { token });
                    continue;
                }
            };

            match self.is_confirmed(&record.media_id).await {
                Ok(true) => {
                    // Confirmation raced ahead of this scan: treat the
                    // record as already resolved, never as abandoned.
                    debug!(%token, media_id = %record.media_id, "Retiring confirmed record during scan");
                    if let Err(e) = self.retire(&token).await {
                        warn!(%token, error = %e, "Retire of confirmed record failed");
                    }
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // Without a readable marker we must not hand the record
                    // to the sweeper for deletion.
                    warn!(%token, error = %e, "Marker check failed during scan; skipping");
                    continue;
                }
            }

            entries.push(ExpiredEntry::Pending(record));
        }

        Ok(entries)
    }

    /// Delete the record and its index entry. Retiring a token twice, or a
    /// token that never existed, is a no-op.
    pub async fn retire(&self, token: &str) -> Result<(), AppError> {
        self.store.delete(&pending_key(token)).await?;
        self.store.zrem(EXPIRY_INDEX, token).await?;
        Ok(())
    }

    /// Whether a confirmed marker exists for `media_id`.
    pub async fn is_confirmed(&self, media_id: &str) -> Result<bool, AppError> {
        Ok(self.store.get(&confirmed_key(media_id)).await?.is_some())
    }

    /// Decoded confirmed marker for `media_id`, if present. An undecodable
    /// marker is treated as absent; the caller rewrites it.
    async fn read_marker(&self, media_id: &str) -> Result<Option<ConfirmedMarker>, AppError> {
        let Some(payload) = self.store.get(&confirmed_key(media_id)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(marker) => Ok(Some(marker)),
            Err(e) => {
                warn!(media_id, error = %e, "Undecodable confirmed marker; rewriting");
                Ok(None)
            }
        }
    }
}
