//! Bounded LRU cache and memoization.
//!
//! This module provides the caching layer used by the polygon helpers to
//! avoid recomputing expensive geometry transforms on identical inputs:
//!
//! - [`LruCache`]: fixed-capacity store with least-recently-used eviction
//! - [`Memoizer`]: wraps a pure function with a private `LruCache`
//! - [`KeyFn`], [`JsonKey`], [`HashedJsonKey`]: cache key derivation
//! - [`SyncMemoizer`] / `AsyncMemoizer`: variants for concurrent callers
//!
//! ## Example
//!
//! ```rust
//! use polycache::cache::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get("a");
//! cache.set("c", 3); // evicts "b"
//!
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.get("a"), Some(&1));
//! ```

mod key;
mod lru;
mod memoize;
mod shared;

pub use self::key::{canonical_json, HashedJsonKey, JsonKey, KeyFn};
pub(crate) use self::key::sha256_hex;
pub use self::lru::{CacheStats, LruCache, DEFAULT_CAPACITY};
pub use self::memoize::Memoizer;
#[cfg(feature = "async")]
pub use self::shared::AsyncMemoizer;
pub use self::shared::SyncMemoizer;
