//! One independently locked partition of a [`Cache`](crate::cache::Cache).
//!
//! A shard owns three structures that must always agree:
//!
//! ```text
//!   index:   FxHashMap<K, SlotId>        key → slot
//!   entries: SlotArena<Slot<K, V>>       slot → (entry, key hash)
//!   policy:  ShardPolicy                 eviction order over slots
//!
//!   index.len() == entries.len() == policy.len() <= capacity
//! ```
//!
//! The shard is not synchronized itself; the cache wraps each one in a
//! `parking_lot::RwLock`.

use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::cache::entry::CacheEntry;
use crate::config::EvictionConfig;
use crate::ds::{SlotArena, SlotId};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{
    CacheMetrics, CacheMetricsSnapshot, CoreMetricsRecorder, MetricsSnapshotProvider,
};
use crate::policy::ShardPolicy;
use crate::traits::EvictionPolicy;

#[derive(Debug)]
struct Slot<K, V> {
    entry: CacheEntry<K, V>,
    hash: u64,
}

#[derive(Debug)]
pub(crate) struct Shard<K, V> {
    id: usize,
    index: FxHashMap<K, SlotId>,
    entries: SlotArena<Slot<K, V>>,
    policy: ShardPolicy,
    evicted: Vec<SlotId>,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn new(id: usize, capacity: usize, config: &EvictionConfig) -> Self {
        Self {
            id,
            index: FxHashMap::default(),
            entries: SlotArena::with_capacity(capacity),
            policy: ShardPolicy::new(config, capacity),
            evicted: Vec::new(),
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.policy.capacity()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Stores `key → value`, replacing any previous entry for `key`, then
    /// evicts until the shard is back within capacity.
    pub(crate) fn insert(&mut self, key: K, value: V, hash: u64) -> CacheEntry<K, V> {
        if let Some(old) = self.index.get(&key).copied() {
            self.policy.on_remove(old);
            self.entries.remove(old);
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
        } else {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_new();
        }

        let entry = CacheEntry::new(key.clone(), value);
        let slot = self.entries.insert(Slot {
            entry: entry.clone(),
            hash,
        });
        self.index.insert(key, slot);
        self.policy.on_insert(slot, hash);
        self.evict();
        entry
    }

    fn evict(&mut self) {
        let mut evicted = std::mem::take(&mut self.evicted);
        self.policy.evict_if_over_capacity(&mut evicted);
        if evicted.is_empty() {
            self.evicted = evicted;
            return;
        }

        let count = evicted.len();
        for id in evicted.drain(..) {
            if let Some(slot) = self.entries.remove(id) {
                self.index.remove(slot.entry.key());
            }
        }
        self.evicted = evicted;

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entries(count as u64);
        tracing::trace!(shard = self.id, count, policy = self.policy.name(), "evicted entries");
    }

    /// Looks up `key` and tells the policy about the hit.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.get(key).copied() else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        let slot = self.entries.get(id)?;
        let entry = slot.entry.clone();
        self.policy.on_get(id, slot.hash);
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        Some(entry)
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.remove(key)?;
        self.policy.on_remove(id);
        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        self.entries.remove(id).map(|slot| slot.entry)
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
        self.policy.clear();
        self.evicted.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    pub(crate) fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            usage: self.len(),
            capacity: self.capacity(),
            ..self.metrics.snapshot()
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.entries.len() || self.index.len() != self.policy.len() {
            return Err(InvariantError::new(format!(
                "shard {}: index {} / entries {} / policy {} disagree",
                self.id,
                self.index.len(),
                self.entries.len(),
                self.policy.len()
            )));
        }
        if self.len() > self.capacity() {
            return Err(InvariantError::new(format!(
                "shard {}: len {} over capacity {}",
                self.id,
                self.len(),
                self.capacity()
            )));
        }
        for (key, &id) in &self.index {
            let Some(slot) = self.entries.get(id) else {
                return Err(InvariantError::new(format!(
                    "shard {}: index points at empty {id:?}",
                    self.id
                )));
            };
            if slot.entry.key() != key {
                return Err(InvariantError::new(format!(
                    "shard {}: {id:?} holds a different key",
                    self.id
                )));
            }
            if !self.policy.contains(id) {
                return Err(InvariantError::new(format!(
                    "shard {}: {id:?} untracked by {}",
                    self.id,
                    self.policy.name()
                )));
            }
        }
        self.policy.check_invariants()
    }
}
