use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::metrics::CACHE_SIZE;

pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

// Cache entry with its expiry
#[derive(Clone)]
pub struct CacheEntry {
    pub payload: String,
    pub expires_at: Instant,
}

// In-process store; expired entries are swept on every write and the map
// never holds more than `max_entries`
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            // zero would evict forever
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.payload.clone());
            }
        }
        // expired (or absent); remove_if keeps a concurrent fresh write
        if self
            .entries
            .remove_if(key, |_, e| e.expires_at <= now)
            .is_some()
        {
            CACHE_SIZE.set(self.entries.len() as f64);
        }
        None
    }

    // Overwrites wholesale, no in-place update
    pub fn put(&self, key: &str, payload: &str, ttl: Duration) {
        let now = Instant::now();
        let Some(expires_at) = now.checked_add(ttl) else {
            debug!(key = key, ttl_seconds = ttl.as_secs(), "TTL out of range, not cached");
            return;
        };

        self.evict_expired(now);
        if !self.entries.contains_key(key) {
            while self.entries.len() >= self.max_entries {
                if !self.evict_soonest_expiring() {
                    break;
                }
            }
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                payload: payload.to_string(),
                expires_at,
            },
        );
        CACHE_SIZE.set(self.entries.len() as f64);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&self, now: Instant) {
        self.entries.retain(|_, e| e.expires_at > now);
    }

    fn evict_soonest_expiring(&self) -> bool {
        let victim = self
            .entries
            .iter()
            .min_by_key(|e| e.value().expires_at)
            .map(|e| e.key().clone());
        match victim {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }
}
