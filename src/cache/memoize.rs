//! Memoization wrapper around a private [`LruCache`].

use std::fmt;
use std::marker::PhantomData;

use super::key::{JsonKey, KeyFn};
use super::lru::{CacheStats, LruCache};
use crate::types::config::CacheConfig;
use crate::types::errors::{PolyCacheError, PolyCacheResult};

/// Caches the results of a pure function, keyed by its arguments.
///
/// Each memoizer owns its cache; two memoizers built around the same
/// function never share entries. Multiple arguments are passed as a tuple.
///
/// # Example
///
/// ```rust
/// use polycache::cache::Memoizer;
///
/// let mut square = Memoizer::new(|n: &u64| n * n);
/// assert_eq!(square.call(&4).unwrap(), 16);
/// assert_eq!(square.call(&4).unwrap(), 16); // served from cache
/// ```
pub struct Memoizer<A: ?Sized, R, F, K = JsonKey> {
    func: F,
    key_fn: K,
    cache: LruCache<String, R>,
    _args: PhantomData<fn(&A)>,
}

impl<A: ?Sized, R, F> Memoizer<A, R, F, JsonKey> {
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
            cache: LruCache::default(),
            _args: PhantomData,
        }
    }
}

impl<A: ?Sized, R, F, K> Memoizer<A, R, F, K> {
    /// Replaces the key derivation strategy.
    pub fn with_key_fn<K2>(self, key_fn: K2) -> Memoizer<A, R, F, K2>
    where
        K2: KeyFn<A>,
    {
        Memoizer {
            func: self.func,
            key_fn,
            cache: self.cache,
            _args: PhantomData,
        }
    }

    /// Replaces the cache with an empty one of the given capacity.
    ///
    /// # Errors
    /// Returns [`PolyCacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_capacity(mut self, capacity: usize) -> PolyCacheResult<Self> {
        self.cache = LruCache::new(capacity)?;
        Ok(self)
    }

    /// Replaces the cache with an empty one sized by `[cache] capacity`.
    ///
    /// # Errors
    /// Returns [`PolyCacheError::InvalidCapacity`] when the capacity is zero.
    pub fn with_config(mut self, config: &CacheConfig) -> PolyCacheResult<Self> {
        self.cache = LruCache::from_config(config)?;
        Ok(self)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.cache.size()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Drops every cached result.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Returns statistics for the underlying cache.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn resolve<E>(
        &mut self,
        args: &A,
        compute: impl FnOnce(&F, &A) -> Result<R, E>,
    ) -> Result<R, E>
    where
        K: KeyFn<A>,
        R: Clone,
        E: From<PolyCacheError>,
    {
        let key = self.key_fn.derive(args)?;

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(key_len = key.len(), "Memoized call hit");
            return Ok(cached.clone());
        }

        tracing::debug!(key_len = key.len(), "Memoized call miss");
        let result = compute(&self.func, args)?;
        self.cache.set(key, result.clone());
        Ok(result)
    }
}

impl<A: ?Sized, R: Clone, F, K: KeyFn<A>> Memoizer<A, R, F, K> {
    /// Returns the cached result for `args`, computing it on a miss.
    ///
    /// # Errors
    /// Only key derivation can fail here.
    pub fn call(&mut self, args: &A) -> PolyCacheResult<R>
    where
        F: Fn(&A) -> R,
    {
        self.resolve(args, |func, args| Ok(func(args)))
    }

    /// Like [`call`](Self::call) for fallible functions.
    ///
    /// An error from the wrapped function is returned as is and leaves the
    /// cache untouched for that key.
    pub fn try_call<E>(&mut self, args: &A) -> Result<R, E>
    where
        F: Fn(&A) -> Result<R, E>,
        E: From<PolyCacheError>,
    {
        self.resolve(args, |func, args| func(args))
    }
}

impl<A: ?Sized, R, F, K> fmt::Debug for Memoizer<A, R, F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_square_computed_once() {
        let calls = Cell::new(0);
        let mut square = Memoizer::new(|n: &u64| {
            calls.set(calls.get() + 1);
            n * n
        });

        assert_eq!(square.call(&4).unwrap(), 16);
        assert_eq!(square.call(&4).unwrap(), 16);
        assert_eq!(square.call(&4).unwrap(), 16);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_distinct_inputs_distinct_entries() {
        let calls = Cell::new(0);
        let mut double = Memoizer::new(|n: &i32| {
            calls.set(calls.get() + 1);
            n * 2
        });

        assert_eq!(double.call(&1).unwrap(), 2);
        assert_eq!(double.call(&2).unwrap(), 4);
        assert_eq!(calls.get(), 2);
        assert_eq!(double.len(), 2);
    }

    #[test]
    fn test_tuple_arguments() {
        let mut add = Memoizer::new(|(a, b): &(i32, i32)| a + b);

        assert_eq!(add.call(&(1, 2)).unwrap(), 3);
        assert_eq!(add.call(&(2, 1)).unwrap(), 3);
        assert_eq!(add.len(), 2);
    }

    #[test]
    fn test_custom_key_fn_groups_inputs() {
        let calls = Cell::new(0);
        let mut len = Memoizer::new(|s: &String| {
            calls.set(calls.get() + 1);
            s.len()
        })
        .with_key_fn(|s: &String| -> PolyCacheResult<String> { Ok(s.to_lowercase()) });

        assert_eq!(len.call(&"ABC".to_string()).unwrap(), 3);
        assert_eq!(len.call(&"abc".to_string()).unwrap(), 3);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_capacity_bounds_cache() {
        let calls = Cell::new(0);
        let mut identity = Memoizer::new(|n: &u32| {
            calls.set(calls.get() + 1);
            *n
        })
        .with_capacity(2)
        .unwrap();

        identity.call(&1).unwrap();
        identity.call(&2).unwrap();
        identity.call(&3).unwrap(); // evicts 1
        identity.call(&1).unwrap(); // recomputed

        assert_eq!(identity.len(), 2);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = Memoizer::new(|n: &u32| *n).with_capacity(0);
        assert!(matches!(result, Err(PolyCacheError::InvalidCapacity(0))));
    }

    #[test]
    fn test_default_capacity() {
        let memo = Memoizer::new(|n: &u32| *n);
        assert_eq!(memo.capacity(), 100);
    }

    #[test]
    fn test_failure_not_cached() {
        let calls = Cell::new(0);
        let mut parse = Memoizer::fallible(|s: &str| {
            calls.set(calls.get() + 1);
            s.parse::<i32>()
                .map_err(|e| PolyCacheError::other(e.to_string()))
        });

        assert!(parse.try_call("nope").is_err());
        assert!(parse.try_call("nope").is_err());
        assert_eq!(calls.get(), 2);
        assert!(parse.is_empty());

        assert_eq!(parse.try_call("7").unwrap(), 7);
        assert_eq!(parse.try_call("7").unwrap(), 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_key_failure_fails_call() {
        let calls = Cell::new(0);
        let mut memo = Memoizer::new(|n: &u32| {
            calls.set(calls.get() + 1);
            *n
        })
        .with_key_fn(|_: &u32| -> PolyCacheResult<String> {
            Err(PolyCacheError::KeyDerivation("unserializable".to_string()))
        });

        let result = memo.call(&1);
        assert!(matches!(result, Err(PolyCacheError::KeyDerivation(_))));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_non_finite_arguments_never_share_entries() {
        let calls = Cell::new(0);
        let mut is_nan = Memoizer::new(|x: &f64| {
            calls.set(calls.get() + 1);
            x.is_nan()
        });

        assert!(matches!(
            is_nan.call(&f64::NAN),
            Err(PolyCacheError::KeyDerivation(_))
        ));
        assert!(matches!(
            is_nan.call(&f64::INFINITY),
            Err(PolyCacheError::KeyDerivation(_))
        ));
        assert!(is_nan.call(&f64::NEG_INFINITY).is_err());
        assert_eq!(calls.get(), 0);
        assert!(is_nan.is_empty());

        assert!(!is_nan.call(&1.0).unwrap());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut memo = Memoizer::new(|n: &u32| n + 1);
        memo.call(&1).unwrap();
        memo.call(&1).unwrap();

        let stats = memo.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        memo.clear();
        assert!(memo.is_empty());
    }
}
