//! Cache store backends.
//!
//! The contract is deliberately narrow: get-by-key, set-with-TTL, and a
//! connectivity probe for readiness checks. Expiry is owned by the backend.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;

use super::key::CacheKey;
use crate::error::CacheError;

// ============================================================================
// CONTRACT
// ============================================================================

/// Key-value store used for response caching.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the bytes stored under `key`, if present and not expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), CacheError>;

    fn name(&self) -> &'static str;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

struct MemoryEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

/// Process-local store for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::store("store lock poisoned"))?;

        if let Some(entry) = entries.get(key.as_str()) {
            if entry.expires_at <= Instant::now() {
                entries.remove(key.as_str());
                return Ok(None);
            }
            return Ok(Some(entry.data.clone()));
        }

        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::store("store lock poisoned"))?;

        entries.insert(
            key.as_str().to_string(),
            MemoryEntry {
                data: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// REDIS STORE
// ============================================================================

/// Redis-backed store using a multiplexed async connection.
///
/// TTL is enforced with SETEX; entries are never deleted explicitly.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisStore {
    /// Connect to Redis at `url` (e.g. `redis://:password@host:6379/0`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::store(format!("redis client error: {e}")))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::store(format!("redis connection error: {e}")))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();

        let result: Option<Vec<u8>> = conn
            .get(key.as_str())
            .await
            .map_err(|e| CacheError::store(format!("redis GET error: {e}")))?;

        Ok(result)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        // SETEX with a zero expiry is a Redis error; clamp to one second
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key.as_str(), value, ttl_secs)
            .await
            .map_err(|e| CacheError::store(format!("redis SETEX error: {e}")))?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::store(format!("redis PING error: {e}")))?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
