//! In-memory cache for tests and single-process deployments.
//!
//! [`InMemoryCache`] keeps entries in a `HashMap` behind a `RwLock`. Expired
//! entries are skipped on read and swept on the next write that touches
//! them.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::traits::CacheService;

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |t| now < t)
    }
}

/// An in-memory implementation of [`CacheService`].
#[derive(Debug)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, including ones that have expired but not
    /// yet been swept.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> CacheError {
    CacheError::Poisoned(e.to_string())
}

impl CacheService for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let entries = self.entries.read().map_err(poisoned)?;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let now = Instant::now();
        entries.retain(|_, e| e.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|d| now + d),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        let removed = before - entries.len();
        debug!(prefix, removed, "invalidated cache prefix");
        Ok(removed)
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }
}
