//! Sharded, capacity-bounded key/value cache.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────── Cache<K, V> ───────────────────────────────┐
//!   │  name, capacity, ShardSelector                                          │
//!   │                                                                         │
//!   │   key ─► hash ─► hash % N                                               │
//!   │                      │                                                  │
//!   │        ┌─────────────┼─────────────┬─────────────┐                      │
//!   │        ▼             ▼             ▼             ▼                      │
//!   │   RwLock<Shard>  RwLock<Shard>    ...       RwLock<Shard>               │
//!   │   cap c/N (+1)   cap c/N (+1)               cap c/N                     │
//!   └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shard `i` gets `capacity / N` entries plus one of the `capacity % N`
//! leftovers if `i < capacity % N`, so shard capacities always add up to the
//! cache capacity. With fewer entries than shards some shards hold nothing:
//! an insert routed there hands back its entry, which is evicted at once.
//!
//! ## Locking
//!
//! | Operation                              | Lock                  |
//! |----------------------------------------|-----------------------|
//! | `insert`, `get`, `remove`              | one shard, write      |
//! | `contains`                             | one shard, read       |
//! | `clear`                                | every shard, write    |
//! | `usage`, `metrics`                     | every shard, read     |
//!
//! `get` needs the write lock because every policy except FIFO updates
//! recency or frequency state on a hit. Cross-shard aggregates are summed
//! shard by shard and are not a single atomic snapshot.
//!
//! ## Example
//!
//! ```
//! use shardcache::builder::CacheBuilder;
//! use shardcache::config::S3FifoConfig;
//!
//! let cache = CacheBuilder::new(100)
//!     .with_shards(4)
//!     .with_eviction_config(S3FifoConfig::default())
//!     .build::<String, u64>()
//!     .unwrap();
//!
//! cache.insert("a".to_string(), 1);
//! assert_eq!(cache.get("a"), Some(1));
//! assert!(cache.contains("a"));
//! assert_eq!(cache.remove("a").map(|e| *e.value()), Some(1));
//! assert!(cache.is_empty());
//! ```

mod entry;
mod shard;

pub use entry::CacheEntry;

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::builder::CacheBuilder;
use crate::config::EvictionConfig;
use crate::ds::ShardSelector;
use crate::error::ConfigError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetricsSnapshot;
use shard::Shard;

/// Cache over opaque byte keys and values.
pub type ByteCache = Cache<Bytes, Bytes>;

/// Fixed hash seed so routing is stable across runs and processes.
const SHARD_SEED: u64 = 0x5348_4152_4443_4143;

struct CacheInner<K, V> {
    name: String,
    capacity: usize,
    selector: ShardSelector,
    shards: Box<[RwLock<Shard<K, V>>]>,
}

/// Thread-safe sharded cache. Cloning is cheap and shares the shards.
pub struct Cache<K, V> {
    inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Builds a cache with default settings: one shard and LRU eviction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        CacheBuilder::new(capacity).build()
    }

    /// Assembles a cache from already validated parts.
    pub(crate) fn from_parts(
        name: String,
        capacity: usize,
        shard_count: usize,
        config: &EvictionConfig,
    ) -> Self {
        let base = capacity / shard_count;
        let extra = capacity % shard_count;
        let shards = (0..shard_count)
            .map(|i| {
                let shard_capacity = base + usize::from(i < extra);
                RwLock::new(Shard::new(i, shard_capacity, config))
            })
            .collect();

        Self {
            inner: Arc::new(CacheInner {
                name,
                capacity,
                selector: ShardSelector::new(shard_count, SHARD_SEED),
                shards,
            }),
        }
    }

    #[inline]
    fn route<Q>(&self, key: &Q) -> (&RwLock<Shard<K, V>>, u64)
    where
        Q: Hash + ?Sized,
    {
        let hash = self.inner.selector.hash_key(key);
        let idx = self.inner.selector.shard_for_hash(hash);
        (&self.inner.shards[idx], hash)
    }

    /// Inserts or overwrites `key`, returning a handle to the stored entry.
    ///
    /// If the owning shard is full, victims chosen by the eviction policy
    /// are dropped first. With a tiny capacity the new entry itself may be
    /// the victim; the returned handle is still valid.
    pub fn insert(&self, key: K, value: V) -> CacheEntry<K, V> {
        let (shard, hash) = self.route(&key);
        shard.write().insert(key, value, hash)
    }

    /// Returns a clone of the value stored for `key` and records the hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_entry(key).map(|entry| entry.value().clone())
    }

    /// Like [`get`](Self::get) but returns the shared entry handle.
    pub fn get_entry<Q>(&self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (shard, _) = self.route(key);
        shard.write().get(key)
    }

    /// Removes `key`, returning the entry it held.
    pub fn remove<Q>(&self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (shard, _) = self.route(key);
        shard.write().remove(key)
    }

    /// Returns `true` if `key` is cached. Does not count as an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (shard, _) = self.route(key);
        shard.read().contains(key)
    }

    /// Drops every entry along with ghost and frequency history.
    pub fn clear(&self) {
        for shard in self.inner.shards.iter() {
            shard.write().clear();
        }
    }

    /// Number of cached entries, summed shard by shard.
    pub fn usage(&self) -> usize {
        self.inner.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.usage() == 0
    }

    /// Total capacity in entries.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn shards(&self) -> usize {
        self.inner.shards.len()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Eviction policy name (`"fifo"`, `"s3fifo"`, `"lru"` or `"lfu"`).
    pub fn policy(&self) -> &'static str {
        self.inner.shards[0].read().policy_name()
    }

    /// Capacity of each shard, in shard order.
    pub fn shard_capacities(&self) -> Vec<usize> {
        self.inner
            .shards
            .iter()
            .map(|shard| shard.read().capacity())
            .collect()
    }

    /// Sums per-shard counters into one snapshot.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        let mut total = CacheMetricsSnapshot::default();
        for shard in self.inner.shards.iter() {
            total.merge(&shard.read().metrics_snapshot());
        }
        total
    }

    /// Validates every shard's index, arena and policy bookkeeping.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for shard in self.inner.shards.iter() {
            shard.read().check_invariants()?;
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name())
            .field("capacity", &self.capacity())
            .field("shards", &self.shards())
            .field("usage", &self.usage())
            .finish()
    }
}
