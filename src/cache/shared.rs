//! Memoizers that can be shared between concurrent callers.
//!
//! The cache of each memoizer sits behind a single mutex. The lock is held
//! only for the lookup and the store, never while the wrapped function runs,
//! so concurrent misses on the same key each compute the value and the last
//! one to finish wins. Callers that need single-flight semantics must
//! coordinate outside the memoizer.

use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::key::{JsonKey, KeyFn};
use super::lru::{CacheStats, LruCache};
use crate::types::errors::{PolyCacheError, PolyCacheResult};

// ═══════════════════════════════════════════════════════════════════════════
// SyncMemoizer
// ═══════════════════════════════════════════════════════════════════════════

/// Thread-safe memoizer for synchronous functions.
pub struct SyncMemoizer<A: ?Sized, R, F, K = JsonKey> {
    func: F,
    key_fn: K,
    cache: Mutex<LruCache<String, R>>,
    _args: PhantomData<fn(&A)>,
}

impl<A: ?Sized, R, F> SyncMemoizer<A, R, F, JsonKey> {
    /// Wraps an infallible function with the default key and capacity.
    pub fn new(func: F) -> Self
    where
        F: Fn(&A) -> R,
    {
        Self::build(func)
    }

    /// Wraps a function that may fail. Failures are never cached.
    pub fn fallible<E>(func: F) -> Self
    where
        F: Fn(&A) -> Result<R, E>,
    {
        Self::build(func)
    }

    fn build(func: F) -> Self {
        Self {
            func,
            key_fn: JsonKey,
            cache: Mutex::new(LruCache::default()),
            _args: PhantomData,
        }
    }
}

impl<A: ?Sized, R, F, K> SyncMemoizer<A, R, F, K> {
    /// Replaces the key derivation strategy.
    pub fn with_key_fn<K2: KeyFn<A>>(self, key_fn: K2) -> SyncMemoizer<A, R, F, K2> {
        SyncMemoizer {
            func: self.func,
            key_fn,
            cache: self.cache,
            _args: PhantomData,
        }
    }

    /// Replaces the cache with an empty one of the given capacity.
    pub fn with_capacity(mut self, capacity: usize) -> PolyCacheResult<Self> {
        self.cache = Mutex::new(LruCache::new(capacity)?);
        Ok(self)
    }

    // Nothing panics while the lock is held, so a poisoned lock still guards
    // a consistent cache.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, R>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().size()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    fn resolve<E>(&self, args: &A, compute: impl FnOnce(&F, &A) -> Result<R, E>) -> Result<R, E>
    where
        K: KeyFn<A>,
        R: Clone,
        E: From<PolyCacheError>,
    {
        let key = self.key_fn.derive(args)?;

        let cached = self.lock().get(&key).cloned();
        if let Some(value) = cached {
            return Ok(value);
        }

        let result = compute(&self.func, args)?;
        self.lock().set(key, result.clone());
        Ok(result)
    }
}

impl<A: ?Sized, R: Clone, F, K: KeyFn<A>> SyncMemoizer<A, R, F, K> {
    /// Returns the cached result for `args`, computing it on a miss.
    pub fn call(&self, args: &A) -> PolyCacheResult<R>
    where
        F: Fn(&A) -> R,
    {
        self.resolve(args, |func, args| Ok(func(args)))
    }

    /// Like [`call`](Self::call) for fallible functions.
    pub fn try_call<E>(&self, args: &A) -> Result<R, E>
    where
        F: Fn(&A) -> Result<R, E>,
        E: From<PolyCacheError>,
    {
        self.resolve(args, |func, args| func(args))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AsyncMemoizer
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(feature = "async")]
pub use self::async_memo::AsyncMemoizer;

#[cfg(feature = "async")]
mod async_memo {
    use std::future::Future;
    use std::marker::PhantomData;

    use tokio::sync::Mutex;

    use super::super::key::{JsonKey, KeyFn};
    use super::super::lru::{CacheStats, LruCache};
    use crate::types::errors::{PolyCacheError, PolyCacheResult};

    /// Memoizer for asynchronous functions.
    ///
    /// Only completed values are cached. Arguments are taken by value so the
    /// returned future does not borrow them.
    pub struct AsyncMemoizer<A, R, F, K = JsonKey> {
        func: F,
        key_fn: K,
        cache: Mutex<LruCache<String, R>>,
        _args: PhantomData<fn(A)>,
    }

    impl<A, R, F> AsyncMemoizer<A, R, F, JsonKey> {
        /// Wraps an async function with the default key and capacity.
        pub fn new<Fut, E>(func: F) -> Self
        where
            F: Fn(A) -> Fut,
            Fut: Future<Output = Result<R, E>>,
        {
            Self {
                func,
                key_fn: JsonKey,
                cache: Mutex::new(LruCache::default()),
                _args: PhantomData,
            }
        }
    }

    impl<A, R, F, K> AsyncMemoizer<A, R, F, K> {
        /// Replaces the key derivation strategy.
        pub fn with_key_fn<K2: KeyFn<A>>(self, key_fn: K2) -> AsyncMemoizer<A, R, F, K2> {
            AsyncMemoizer {
                func: self.func,
                key_fn,
                cache: self.cache,
                _args: PhantomData,
            }
        }

        /// Replaces the cache with an empty one of the given capacity.
        pub fn with_capacity(mut self, capacity: usize) -> PolyCacheResult<Self> {
            self.cache = Mutex::new(LruCache::new(capacity)?);
            Ok(self)
        }

        pub async fn len(&self) -> usize {
            self.cache.lock().await.size()
        }

        pub async fn clear(&self) {
            self.cache.lock().await.clear();
        }

        pub async fn stats(&self) -> CacheStats {
            self.cache.lock().await.stats()
        }

        /// Returns the cached result for `args`, awaiting the wrapped
        /// function on a miss.
        pub async fn call<Fut, E>(&self, args: A) -> Result<R, E>
        where
            F: Fn(A) -> Fut,
            Fut: Future<Output = Result<R, E>>,
            K: KeyFn<A>,
            R: Clone,
            E: From<PolyCacheError>,
        {
            let key = self.key_fn.derive(&args)?;

            let cached = self.cache.lock().await.get(&key).cloned();
            if let Some(value) = cached {
                tracing::debug!(key_len = key.len(), "Async memoized call hit");
                return Ok(value);
            }

            tracing::debug!(key_len = key.len(), "Async memoized call miss");
            let result = (self.func)(args).await?;
            self.cache.lock().await.set(key, result.clone());
            Ok(result)
        }
    }
}
