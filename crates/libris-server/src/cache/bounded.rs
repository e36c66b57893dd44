//! Bounded per-entity result cache.
//!
//! Maps an opaque key to the ordered list of entities a query returned.
//! Capacity is hard: inserting a new key into a full cache first evicts the
//! least-recently-inserted entry. Overwriting a resident key keeps its
//! position and reads never reorder, so eviction order is insertion order.
//!
//! Map and order live in one `IndexMap` behind one lock, so a reader never
//! sees a half-applied insert or eviction.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;

use crate::metrics;

/// Point-in-time counters for one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub name: &'static str,
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub clears: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    clears: AtomicU64,
}

#[derive(Debug)]
pub struct BoundedResultCache<V> {
    name: &'static str,
    capacity: usize,
    entries: RwLock<IndexMap<String, Vec<V>>>,
    counters: Counters,
}

impl<V: Clone> BoundedResultCache<V> {
    /// Creates an empty cache. A zero capacity is raised to 1.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            entries: RwLock::new(IndexMap::with_capacity(capacity)),
            counters: Counters::default(),
        }
    }

    /// Returns a clone of the cached list. `Some(vec![])` is a cached empty
    /// result and differs from `None`.
    pub fn get(&self, key: &str) -> Option<Vec<V>> {
        let found = self.entries.read().get(key).cloned();
        if found.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_hit(self.name);
            tracing::debug!(cache = self.name, key = %key, "cache hit");
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_miss(self.name);
            tracing::debug!(cache = self.name, key = %key, "cache miss");
        }
        found
    }

    /// Inserts or overwrites `key`.
    pub fn put(&self, key: impl Into<String>, values: Vec<V>) {
        let key = key.into();
        let mut map = self.entries.write();

        if let Some(slot) = map.get_mut(&key) {
            *slot = values;
            return;
        }

        if map.len() >= self.capacity {
            if let Some((evicted, _)) = map.shift_remove_index(0) {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_eviction(self.name);
                tracing::debug!(cache = self.name, key = %evicted, "evicted oldest entry");
            }
        }

        map.insert(key, values);
        debug_assert!(
            map.len() <= self.capacity,
            "cache {} holds {} entries over capacity {}",
            self.name,
            map.len(),
            self.capacity
        );
        metrics::set_cache_entries(self.name, map.len());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let removed = {
            let mut map = self.entries.write();
            let removed = map.len();
            map.clear();
            removed
        };
        self.counters.clears.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_clear(self.name);
        metrics::set_cache_entries(self.name, 0);
        tracing::debug!(cache = self.name, removed, "cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Keys in eviction order, oldest first.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name,
            capacity: self.capacity,
            entries: self.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            clears: self.counters.clears.load(Ordering::Relaxed),
        }
    }
}
