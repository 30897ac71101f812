//! Storage layer for the pending-upload tracker.
//!
//! The store itself is treated as a capability: [`KvStore`] describes the
//! per-key operations and the sorted expiry index the repository needs, and
//! [`RedisStore`] is the production implementation. [`PendingRepository`]
//! owns the key schema and the index-consistency invariants.

pub mod kv;
pub mod redis;
pub mod repository;
pub mod test_helpers;

pub use kv::KvStore;
pub use redis::RedisStore;
pub use repository::{ExpiredEntry, PendingRepository};
