//! Redis-backed [`KvStore`] implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::info;
use uplink_core::AppError;

use crate::kv::KvStore;

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        info!("Connecting to Redis at {}", redis_url);

        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Store(format!("Failed to create Redis client: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Redis: {e}")))?;

        info!("Connected to Redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        // SETEX truncates sub-second TTLs; the shortest TTL this system uses
        // is minutes, so seconds resolution is enough.
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.zadd::<_, _, _, ()>(set, member, score).await?;
        Ok(())
    }

    async fn zrange_by_score(
        &self,
        set: &str,
        max_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .zrangebyscore_limit(set, "-inf", max_score, 0, limit as isize)
            .await?;
        Ok(members)
    }

    async fn zrem(&self, set: &str, member: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.zrem::<_, _, ()>(set, member).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
