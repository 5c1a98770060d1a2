//! The [`CacheService`] trait and its typed helpers.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Key-value store with optional expiry and prefix deletion.
///
/// Values are JSON documents so one backend can hold every response shape.
pub trait CacheService: Send + Sync {
    /// Read a live entry. Expired entries read as `None`.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store `value` under `key`. `ttl = None` never expires.
    fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) -> Result<()>;

    /// Remove one entry. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every entry whose key starts with `prefix`. Returns the count.
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    /// Drop everything.
    fn clear(&self) -> Result<()>;
}

/// Serde conveniences over any [`CacheService`].
pub trait CacheServiceExt: CacheService {
    /// Deserialize a cached value. A value that no longer matches `T` is
    /// treated as a miss.
    fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self
            .get(key)?
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        self.set(key, serde_json::to_value(value)?, ttl)
    }
}

impl<C: CacheService + ?Sized> CacheServiceExt for C {}

/// A cache that stores nothing. Used when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CacheService for NoCache {
    fn get(&self, _key: &str) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: serde_json::Value, _ttl: Option<Duration>) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    fn delete_prefix(&self, _prefix: &str) -> Result<usize> {
        Ok(0)
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }
}
