//! Mutex-guarded in-memory [`KvStore`] implementation.
//!
//! Honors TTLs via stored deadlines checked lazily on read, which lets tests
//! simulate safety-net expiry with short sleeps, and lets orphan tests remove
//! records out-of-band with a plain `delete`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use uplink_core::AppError;

use crate::kv::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn live(&self) -> bool {
        self.expires_at.map(|at| Instant::now() < at).unwrap_or(true)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    sorted: Arc<Mutex<HashMap<String, HashMap<String, f64>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of `set` ascending by score, for index-state assertions.
    pub fn sorted_members(&self, set: &str) -> Vec<String> {
        let sorted = self.sorted.lock().unwrap();
        let Some(members) = sorted.get(set) else {
            return Vec::new();
        };
        let mut pairs: Vec<(String, f64)> =
            members.iter().map(|(m, s)| (m.clone(), *s)).collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(&b.0)));
        pairs.into_iter().map(|(m, _)| m).collect()
    }

    /// Number of live (non-expired) keys, for leak assertions.
    pub fn live_key_count(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.values().filter(|e| e.live()).count()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.live() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), AppError> {
        let mut sorted = self.sorted.lock().unwrap();
        sorted
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn zrange_by_score(
        &self,
        set: &str,
        max_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        let sorted = self.sorted.lock().unwrap();
        let Some(members) = sorted.get(set) else {
            return Ok(Vec::new());
        };
        let mut pairs: Vec<(String, f64)> = members
            .iter()
            .filter(|(_, score)| **score <= max_score)
            .map(|(m, s)| (m.clone(), *s))
            .collect();
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(&b.0)));
        Ok(pairs.into_iter().take(limit).map(|(m, _)| m).collect())
    }

    async fn zrem(&self, set: &str, member: &str) -> Result<(), AppError> {
        let mut sorted = self.sorted.lock().unwrap();
        if let Some(members) = sorted.get_mut(set) {
            members.remove(member);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
