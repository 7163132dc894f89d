//! Owned cache of compiled artifacts.
//!
//! Entries are immutable once inserted. Invalidation evicts them and the
//! next access recompiles; nothing is patched in place. A render holding an
//! `Arc` from before an eviction finishes with the stale value.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// Name-keyed cache of shared values.
pub struct TemplateCache<V> {
    entries: Mutex<HashMap<String, Arc<V>>>,
}

impl<V> TemplateCache<V> {
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.lock().get(key).cloned()
    }

    /// Cached value for `key`, computing and inserting it on a miss.
    ///
    /// `compute` runs without the lock held. When two callers race on the
    /// same key, the first insert wins and both get that value.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(hit) = self.get(key) {
            debug!(key, "template cache hit");
            return Ok(hit);
        }
        let value = Arc::new(compute()?);
        let mut entries = self.entries.lock();
        let stored = entries
            .entry(key.to_owned())
            .or_insert_with(|| Arc::clone(&value));
        Ok(Arc::clone(stored))
    }

    /// Evict everything. Returns how many entries were dropped.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<V> Default for TemplateCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn put<V>(cache: &TemplateCache<V>, key: &str, compute: impl FnOnce() -> V) -> Arc<V> {
        cache
            .get_or_try_insert_with::<()>(key, || Ok(compute()))
            .unwrap()
    }

    #[test]
    fn computes_once_per_key() {
        let cache = TemplateCache::new();
        let calls = Cell::new(0);
        let a = put(&cache, "a", || {
            calls.set(calls.get() + 1);
            1
        });
        let b = put(&cache, "a", || {
            calls.set(calls.get() + 1);
            2
        });
        assert_eq!(*a, 1);
        assert_eq!(*b, 1);
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failed_compute_is_not_cached() {
        let cache: TemplateCache<u32> = TemplateCache::new();
        let err = cache.get_or_try_insert_with("x", || Err("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.is_empty());
        let ok = cache.get_or_try_insert_with::<&str>("x", || Ok(7)).unwrap();
        assert_eq!(*ok, 7);
    }

    #[test]
    fn eviction_leaves_held_values_intact() {
        let cache = TemplateCache::new();
        let old = put(&cache, "t", || "v1".to_owned());
        assert_eq!(cache.invalidate_all(), 1);
        let new = put(&cache, "t", || "v2".to_owned());
        assert_eq!(*old, "v1");
        assert_eq!(*new, "v2");
    }

    #[test]
    fn invalidate_all_counts() {
        let cache = TemplateCache::new();
        let _ = put(&cache, "a", || 1);
        let _ = put(&cache, "b", || 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
