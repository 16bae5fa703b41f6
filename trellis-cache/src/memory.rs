//! In-memory cache backend with per-entry TTL.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use trellis_core::CacheError;

use crate::store::CacheStore;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory cache store.
///
/// Entries expire lazily: an expired entry is removed when it is next read.
/// Suitable as the process-local backend behind [`CacheStore`]; a shared
/// deployment would put a networked store behind the same trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| e.is_fresh(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = Instant::now();

        {
            let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
            match entries.get(key) {
                Some(entry) if entry.is_fresh(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Entry exists but expired; drop it under the write lock.
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        if entries.get(key).is_some_and(|entry| !entry.is_fresh(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| entry.is_fresh(now)))
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }
}
