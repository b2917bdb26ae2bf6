//! Bounded map with insertion-ordered, oldest-first eviction.
//!
//! Uses a VecDeque to track insertion order for constant-time removal of the
//! oldest entry when the cache reaches capacity. Every resident key appears
//! in the deque exactly once.
//!
//! Two deliberate asymmetries versus a conventional LRU:
//! - Inserting an existing key overwrites its value in place and does NOT
//!   promote it to most-recent.
//! - Only a brand-new key can trigger eviction; overwrites never evict,
//!   regardless of current size.
//!
//! Ordering only matters at overflow time, and overflow can only be caused
//! by a new key, so promoting hits or overwrites would be pure overhead for
//! the session-caching workload this serves.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::error::{CacheError, Result};

/// Fixed-capacity mapping from cache key to value, evicting oldest-first.
///
/// The structure itself performs no teardown; evicted values are handed back
/// to the caller, which owns closing them in whatever way its execution
/// model requires (immediate or awaited).
#[derive(Debug)]
pub struct BoundedCache<V> {
    /// Maximum number of resident entries
    capacity: usize,
    /// Key -> value storage
    entries: HashMap<String, V>,
    /// Insertion order for oldest-first eviction
    order: VecDeque<String>,
}

impl<V> BoundedCache<V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Insert `value` under `key`, returning any evicted entries.
    ///
    /// If `key` is already resident its value is overwritten in place, its
    /// recency position is left unchanged, and nothing is evicted. If `key`
    /// is new, oldest entries are removed one at a time until there is room,
    /// so more than one entry may come back when the cache is over capacity.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Vec<(String, V)> {
        let key = key.into();

        if let Some(slot) = self.entries.get_mut(&key) {
            trace!(%key, "overwriting cached entry in place");
            *slot = value;
            return Vec::new();
        }

        let mut evicted = Vec::new();
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(old) = self.entries.remove(&oldest) {
                evicted.push((oldest, old));
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);

        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                resident = self.entries.len(),
                "evicted oldest entries to make room"
            );
        }
        evicted
    }

    /// Look up `key`, failing with [`CacheError::KeyNotFound`] when absent.
    ///
    /// Read-only: a hit does not change the entry's eviction position.
    pub fn get(&self, key: &str) -> Result<&V> {
        self.entries
            .get(key)
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    /// Non-failing lookup. Read-only, like [`get`](Self::get).
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Whether `key` is currently resident.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Current number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove and return every entry, oldest-first, for explicit teardown.
    pub fn drain(&mut self) -> Vec<(String, V)> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(key) = self.order.pop_front() {
            if let Some(value) = self.entries.remove(&key) {
                drained.push((key, value));
            }
        }
        debug!(count = drained.len(), "cache drained");
        drained
    }
}
