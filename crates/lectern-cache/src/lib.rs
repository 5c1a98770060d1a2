//! Cache service for Lectern.
//!
//! Responses to text requests are expensive to assemble (several version
//! lookups, a merge, commentary links) and are memoized here under string
//! keys. Writes to a work invalidate every key under that work's prefix.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use lectern_cache::{CacheService, CacheServiceExt, InMemoryCache};
//!
//! let cache = InMemoryCache::new();
//! cache.put("text:Genesis.1|Genesis 1:1", &vec!["In the beginning"], Some(Duration::from_secs(60))).unwrap();
//! let hit: Option<Vec<String>> = cache.fetch("text:Genesis.1|Genesis 1:1").unwrap();
//! assert_eq!(hit.unwrap()[0], "In the beginning");
//!
//! cache.delete_prefix("text:Genesis.").unwrap();
//! assert!(cache.get("text:Genesis.1|Genesis 1:1").unwrap().is_none());
//! ```

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{CacheError, Result};
pub use memory::InMemoryCache;
pub use traits::{CacheService, CacheServiceExt, NoCache};
