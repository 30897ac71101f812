//! Key-value capability consumed by the repository.

use std::time::Duration;

use async_trait::async_trait;
use uplink_core::AppError;

/// Minimal contract the repository needs from the backing store: opaque
/// values by key with an optional expiry, plus one sorted-by-score index
/// supporting range scans and member removal.
///
/// Individual operations are assumed atomic; cross-key sequences are not,
/// and the repository's repair logic accounts for that.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write `value` at `key`, replacing any previous value, expiring after
    /// `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Delete `key`. Deleting an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Add `member` to the sorted set `set` with `score`, replacing the
    /// member's previous score if present.
    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), AppError>;

    /// Members of `set` with score <= `max_score`, ascending by score, at
    /// most `limit` of them.
    async fn zrange_by_score(
        &self,
        set: &str,
        max_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, AppError>;

    /// Remove `member` from `set`. Removing an absent member is a no-op.
    async fn zrem(&self, set: &str, member: &str) -> Result<(), AppError>;

    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
