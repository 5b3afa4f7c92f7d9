//! Memoization tied to an ontology snapshot, backed by moka.

use std::hash::Hash;

use moka::sync::Cache;

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Snapshot the cached values were derived from.
    pub snapshot: u64,
    /// Number of cached values.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
}

impl CacheStats {
    fn merge(self, other: CacheStats) -> CacheStats {
        CacheStats {
            snapshot: self.snapshot.max(other.snapshot),
            entries: self.entries + other.entries,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
        }
    }
}

/// Upper bound on memoized values per cache.
const MAX_ENTRIES: u64 = 10_000;

/// Key to value memo valid for exactly one snapshot.
#[derive(Debug)]
pub struct MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    snapshot: u64,
    entries: Cache<K, V>,
    hits: u64,
    misses: u64,
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(0)
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache for a snapshot.
    pub fn new(snapshot: u64) -> Self {
        Self {
            snapshot,
            entries: Cache::new(MAX_ENTRIES),
            hits: 0,
            misses: 0,
        }
    }

    /// Snapshot the cached values belong to.
    pub fn snapshot(&self) -> u64 {
        self.snapshot
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        // entry_count lags behind writes until pending maintenance runs.
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every value and move to a new snapshot.
    pub fn invalidate(&mut self, snapshot: u64) {
        self.entries.invalidate_all();
        self.snapshot = snapshot;
    }

    /// Counters for this cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            snapshot: self.snapshot,
            entries: self.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Return the cached value or compute and store it.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return value;
        }
        self.misses += 1;
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    /// Fallible variant of [`Self::get_or_insert_with`]; errors are not cached.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(value);
        }
        self.misses += 1;
        let value = compute()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }
}

/// Sum stats over several caches.
pub(crate) fn combined_stats(stats: impl IntoIterator<Item = CacheStats>) -> CacheStats {
    stats.into_iter().fold(CacheStats::default(), CacheStats::merge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once_per_key() {
        let mut cache: MemoCache<&str, usize> = MemoCache::new(1);
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache.get_or_insert_with("a", || {
                calls += 1;
                42
            });
            assert_eq!(value, 42);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache: MemoCache<&str, usize> = MemoCache::new(1);
        let failed: Result<usize, &str> = cache.get_or_try_insert_with("a", || Err("boom"));
        assert!(failed.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_insert_with::<&str>("a", || Ok(7)), Ok(7));
    }

    #[test]
    fn test_invalidate_moves_snapshot() {
        let mut cache: MemoCache<&str, usize> = MemoCache::new(1);
        cache.get_or_insert_with("a", || 1);
        cache.invalidate(2);
        assert!(cache.is_empty());
        assert_eq!(cache.snapshot(), 2);
        assert_eq!(cache.get_or_insert_with("a", || 5), 5);
    }
}
