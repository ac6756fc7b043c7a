//! Best-effort response cache.
//!
//! Callers only ever see hits and misses: every store failure is logged,
//! counted and then treated as a miss (reads) or a no-op (writes).

mod key;
mod memory;
mod redis_store;

pub use key::{KeyFields, normalize};
pub use memory::{CacheEntry, DEFAULT_MAX_ENTRIES, MemoryCache};
pub use redis_store::RedisCache;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CacheSettings;
use crate::metrics::CACHE_ERRORS;

// Upper bound on a single GET/SET against a remote store
const OP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache serialization error: {0}")]
    Serialization(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

pub enum CacheStore {
    Memory(MemoryCache),
    Redis(RedisCache),
    // always miss, writes are dropped
    Disabled,
}

impl CacheStore {
    /// Build the store named by `settings.url`. A Redis server that cannot be
    /// reached at startup leaves the process running without a cache.
    pub async fn connect(settings: &CacheSettings) -> Self {
        let url = settings.url.trim();
        let store = if url.starts_with("redis://") || url.starts_with("rediss://") {
            match RedisCache::connect(url, settings.connect_timeout).await {
                Ok(redis) => CacheStore::Redis(redis),
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, continuing without cache");
                    CacheStore::Disabled
                }
            }
        } else if url.starts_with("memory") {
            CacheStore::Memory(MemoryCache::with_max_entries(settings.max_entries))
        } else {
            if !matches!(url, "" | "none" | "off") {
                warn!(url = %url, "unrecognized cache URL, caching disabled");
            }
            CacheStore::Disabled
        };

        info!(
            backend = store.backend_name(),
            ttl_seconds = settings.ttl.as_secs(),
            "cache store ready"
        );
        store
    }

    pub fn memory() -> Self {
        CacheStore::Memory(MemoryCache::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            CacheStore::Memory(_) => "memory",
            CacheStore::Redis(_) => "redis",
            CacheStore::Disabled => "disabled",
        }
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheStore::Memory(m) => Ok(m.get(key)),
            CacheStore::Redis(r) => tokio::time::timeout(OP_TIMEOUT, r.get(key))
                .await
                .map_err(|_| CacheError::Timeout(format!("GET {}", key)))?,
            CacheStore::Disabled => Ok(None),
        }
    }

    async fn try_put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(m) => {
                m.put(key, value, ttl);
                Ok(())
            }
            CacheStore::Redis(r) => tokio::time::timeout(OP_TIMEOUT, r.set(key, value, ttl))
                .await
                .map_err(|_| CacheError::Timeout(format!("SET {}", key)))?,
            CacheStore::Disabled => Ok(()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                CACHE_ERRORS.inc();
                warn!(key = key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn put(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.try_put(key, value, ttl).await {
            CACHE_ERRORS.inc();
            warn!(key = key, error = %e, "cache write failed, result not cached");
        }
    }

    // A payload that no longer parses is a miss, not an error
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                CACHE_ERRORS.inc();
                let err = CacheError::Serialization(e.to_string());
                warn!(key = key, error = %err, "cached payload unreadable, treating as miss");
                None
            }
        }
    }

    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(json) => {
                self.put(key, &json, ttl).await;
                debug!(key = key, "cached result");
            }
            Err(e) => {
                CACHE_ERRORS.inc();
                let err = CacheError::Serialization(e.to_string());
                warn!(key = key, error = %err, "result not serializable, not cached");
            }
        }
    }
}
