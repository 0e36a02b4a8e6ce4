//! Invalidation-aware TTL cache in front of recommendation queries.
//!
//! Two scopes: recommendation lists keyed by
//! `(anchor, limit, settings-fingerprint)`, and the slower-moving
//! per-product order-count aggregate. Never authoritative; every entry is
//! reconstructable from the stores, so clearing the cache is always safe.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::domain::ProductId;

/// Cache key for a recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub anchor: ProductId,
    pub limit: usize,
    /// Fingerprint of every setting that changes the output, so stale
    /// settings never serve a mismatched cached result.
    pub fingerprint: u64,
}

impl ListKey {
    pub fn new(anchor: ProductId, limit: usize, fingerprint: u64) -> Self {
        Self {
            anchor,
            limit,
            fingerprint,
        }
    }
}

struct TimedEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> TimedEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe recommendation cache.
pub struct RecommendationCache {
    lists: RwLock<HashMap<ListKey, TimedEntry<Vec<ProductId>>>>,
    counts: RwLock<HashMap<ProductId, TimedEntry<u64>>>,
}

impl RecommendationCache {
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
            counts: RwLock::new(HashMap::new()),
        }
    }

    /// Get a cached recommendation list, dropping it if expired.
    pub fn get_list(&self, key: &ListKey) -> Option<Vec<ProductId>> {
        {
            let lists = self.lists.read();
            match lists.get(key) {
                Some(entry) if !entry.expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.lists.write().remove(key);
        None
    }

    pub fn put_list(&self, key: ListKey, ids: Vec<ProductId>, ttl: Duration) {
        self.lists.write().insert(key, TimedEntry::new(ids, ttl));
    }

    /// Get the cached order count for a product, dropping it if expired.
    pub fn get_count(&self, product: &ProductId) -> Option<u64> {
        {
            let counts = self.counts.read();
            match counts.get(product) {
                Some(entry) if !entry.expired() => return Some(entry.value),
                Some(_) => {}
                None => return None,
            }
        }
        self.counts.write().remove(product);
        None
    }

    pub fn put_count(&self, product: ProductId, count: u64, ttl: Duration) {
        self.counts
            .write()
            .insert(product, TimedEntry::new(count, ttl));
    }

    /// Drop every entry scoped to the given product: its count aggregate and
    /// any list it anchors. Called by the collector after each order, so the
    /// rest of the cache keeps its hit rate under frequent order volume.
    pub fn invalidate_product(&self, product: &ProductId) {
        self.counts.write().remove(product);
        self.lists.write().retain(|key, _| &key.anchor != product);
    }

    /// Drop everything. Correctness-neutral by design.
    pub fn clear(&self) {
        self.lists.write().clear();
        self.counts.write().clear();
    }

    pub fn len(&self) -> usize {
        self.lists.read().len() + self.counts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(anchor: &str) -> ListKey {
        ListKey::new(ProductId::new(anchor), 4, 42)
    }

    fn minute() -> Duration {
        Duration::from_secs(60)
    }

    #[test]
    fn list_roundtrip() {
        let cache = RecommendationCache::new();
        let ids = vec![ProductId::new("x"), ProductId::new("y")];

        assert!(cache.get_list(&key("a")).is_none());
        cache.put_list(key("a"), ids.clone(), minute());
        assert_eq!(cache.get_list(&key("a")), Some(ids));
    }

    #[test]
    fn different_fingerprint_is_a_different_entry() {
        let cache = RecommendationCache::new();
        cache.put_list(key("a"), vec![ProductId::new("x")], minute());

        let other = ListKey::new(ProductId::new("a"), 4, 43);
        assert!(cache.get_list(&other).is_none());
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = RecommendationCache::new();
        cache.put_list(key("a"), vec![ProductId::new("x")], Duration::ZERO);
        cache.put_count(ProductId::new("a"), 7, Duration::ZERO);

        assert!(cache.get_list(&key("a")).is_none());
        assert!(cache.get_count(&ProductId::new("a")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidation_is_scoped_to_the_product() {
        let cache = RecommendationCache::new();
        cache.put_list(key("a"), vec![ProductId::new("x")], minute());
        cache.put_list(key("b"), vec![ProductId::new("y")], minute());
        cache.put_count(ProductId::new("a"), 3, minute());
        cache.put_count(ProductId::new("b"), 5, minute());

        cache.invalidate_product(&ProductId::new("a"));

        assert!(cache.get_list(&key("a")).is_none());
        assert!(cache.get_count(&ProductId::new("a")).is_none());
        assert_eq!(cache.get_list(&key("b")), Some(vec![ProductId::new("y")]));
        assert_eq!(cache.get_count(&ProductId::new("b")), Some(5));
    }

    #[test]
    fn clear_empties_both_scopes() {
        let cache = RecommendationCache::new();
        cache.put_list(key("a"), vec![], minute());
        cache.put_count(ProductId::new("a"), 1, minute());

        cache.clear();
        assert!(cache.is_empty());
    }
}
