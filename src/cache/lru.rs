//! Cache LRU de capacidade fixa.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use ::lru::LruCache as RecencyMap;

use crate::types::config::CacheConfig;
use crate::types::errors::{PolyCacheError, PolyCacheResult};

/// Capacidade usada quando nenhuma é informada.
pub const DEFAULT_CAPACITY: usize = 100;

/// Estatísticas do cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,

    /// Número de entradas descartadas para abrir espaço a novas chaves.
    pub evictions: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Armazenamento chave-valor de capacidade fixa com remoção LRU.
///
/// Todo acerto em `get` e todo `set` movem a chave para a posição mais
/// recente. Quando uma chave nova chega com o cache cheio, exatamente uma
/// entrada, a usada há mais tempo, é descartada antes. Todas as operações
/// são O(1).
pub struct LruCache<K, V> {
    entries: RecencyMap<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Cria um novo cache.
    ///
    /// # Errors
    /// Retorna [`PolyCacheError::InvalidCapacity`] quando `capacity` é zero.
    pub fn new(capacity: usize) -> PolyCacheResult<Self> {
        let cap = NonZeroUsize::new(capacity).ok_or(PolyCacheError::InvalidCapacity(capacity))?;
        Ok(Self::with_capacity(cap))
    }

    /// Cria um cache com a capacidade configurada em `[cache]`.
    pub fn from_config(config: &CacheConfig) -> PolyCacheResult<Self> {
        Self::new(config.capacity)
    }

    /// Cria um cache a partir de uma capacidade já validada.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RecencyMap::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Busca uma chave, marcando-a como a mais recente em caso de acerto.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Busca uma chave sem alterar a ordem de uso nem as estatísticas.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.peek(key)
    }

    /// Verifica se a chave existe sem alterar a ordem de uso.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    /// Insere ou atualiza uma entrada.
    ///
    /// Uma chave existente mantém o tamanho e passa a ser a mais recente.
    /// Uma chave nova com o cache cheio remove a entrada menos recente.
    pub fn set(&mut self, key: K, value: V) {
        if self.entries.contains(&key) {
            self.entries.put(key, value);
            return;
        }

        if self.entries.push(key, value).is_some() {
            self.evictions += 1;
            tracing::trace!(
                capacity = self.entries.cap().get(),
                evictions = self.evictions,
                "Evicted least recently used entry"
            );
        }
    }

    /// Remove uma entrada. Retorna se ela existia.
    ///
    /// A ordem de uso das demais entradas não muda.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.pop(key).is_some()
    }

    /// Remove todas as entradas. Capacidade e estatísticas são mantidas.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Número atual de entradas.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Número máximo de entradas.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cópia das chaves atuais, da menos recente para a mais recente.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.entries.iter().rev().map(|(k, _)| k.clone()).collect()
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.entries.cap().get(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    /// Zera os contadores de acertos, erros e remoções.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }
}

impl<K: Hash + Eq, V> Default for LruCache<K, V> {
    fn default() -> Self {
        Self::with_capacity(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl<K: Hash + Eq, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("size", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .field("evictions", &self.evictions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> LruCache<String, i32> {
        LruCache::new(capacity).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LruCache::<String, i32>::new(0);
        assert!(matches!(result, Err(PolyCacheError::InvalidCapacity(0))));
    }

    #[test]
    fn test_default_capacity() {
        let cache: LruCache<String, i32> = LruCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_hit() {
        let mut cache = cache(10);
        cache.set("a".to_string(), 1);

        assert_eq!(cache.get("a"), Some(&1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_miss() {
        let mut cache = cache(10);

        assert_eq!(cache.get("nonexistent"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_lru_eviction_without_access() {
        let mut cache = cache(2);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("c".to_string(), 3); // evicts "a"

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.get("c"), Some(&3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = cache(2);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.get("a");
        cache.set("c".to_string(), 3); // evicts "b"

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.get("c"), Some(&3));
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut cache = cache(2);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        assert_eq!(cache.peek("a"), Some(&1));
        cache.set("c".to_string(), 3);

        assert!(!cache.contains("a"));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_reinsert_updates_value_and_keeps_size() {
        let mut cache = cache(3);
        cache.set("k".to_string(), 1);
        cache.set("other".to_string(), 2);
        cache.set("k".to_string(), 10);

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("k"), Some(&10));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_reinsert_refreshes_recency() {
        let mut cache = cache(2);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("a".to_string(), 11);
        cache.set("c".to_string(), 3); // evicts "b"

        assert_eq!(cache.keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_delete() {
        let mut cache = cache(10);
        cache.set("a".to_string(), 1);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_keeps_order_of_others() {
        let mut cache = cache(3);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);
        cache.set("c".to_string(), 3);
        cache.delete("b");

        assert_eq!(cache.keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_clear_preserves_capacity() {
        let mut cache = cache(4);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);

        cache.clear();

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.capacity(), 4);
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn test_keys_is_snapshot() {
        let mut cache = cache(4);
        cache.set("a".to_string(), 1);
        let keys = cache.keys();
        cache.set("b".to_string(), 2);

        assert_eq!(keys, vec!["a".to_string()]);
        assert_eq!(cache.keys().len(), 2);
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut cache: LruCache<u32, u32> = LruCache::new(3).unwrap();
        for i in 0..50 {
            cache.set(i % 7, i);
            assert!(cache.size() <= 3);
        }
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = cache(1);
        cache.set("a".to_string(), 1);
        cache.set("b".to_string(), 2);

        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = cache(10);
        cache.set("key1".to_string(), 1);

        cache.get("key1"); // Hit
        cache.get("key2"); // Miss
        cache.get("key1"); // Hit

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.666).abs() < 0.01);

        cache.reset_stats();
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().size, 1);
    }
}
