//! Eviction policies.
//!
//! Each policy tracks [`SlotId`]s for one shard and implements
//! [`EvictionPolicy`]. A shard holds its policy as a [`ShardPolicy`], a closed
//! enum over the four algorithms, so calls dispatch with a `match` rather than
//! through a vtable.
//!
//! | Policy    | Type             | Structure                                  |
//! |-----------|------------------|--------------------------------------------|
//! | FIFO      | [`FifoPolicy`]   | one insertion-ordered queue                |
//! | S3-FIFO   | [`S3FifoPolicy`] | small + main queues, ghost fingerprints    |
//! | LRU       | [`LruPolicy`]    | probation + protected (high-priority) pool |
//! | LFU       | [`LfuPolicy`]    | window + probation + protected, sketch     |

pub mod fifo;
pub mod lfu;
pub mod lru;
pub mod s3_fifo;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use s3_fifo::{S3FifoPolicy, S3FifoStats};

use crate::config::EvictionConfig;
use crate::ds::SlotId;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

/// The eviction structure owned by one shard.
#[derive(Debug)]
pub enum ShardPolicy {
    Fifo(FifoPolicy),
    S3Fifo(S3FifoPolicy),
    Lru(LruPolicy),
    Lfu(LfuPolicy),
}

impl ShardPolicy {
    /// Builds the policy selected by `config` for a shard of `capacity`
    /// entries. `config` must already be validated.
    pub fn new(config: &EvictionConfig, capacity: usize) -> Self {
        match config {
            EvictionConfig::Fifo(_) => Self::Fifo(FifoPolicy::new(capacity)),
            EvictionConfig::S3Fifo(cfg) => Self::S3Fifo(S3FifoPolicy::new(capacity, cfg)),
            EvictionConfig::Lru(cfg) => Self::Lru(LruPolicy::new(capacity, cfg)),
            EvictionConfig::Lfu(cfg) => Self::Lfu(LfuPolicy::new(capacity, cfg)),
        }
    }

    fn inner(&self) -> &dyn EvictionPolicy {
        match self {
            Self::Fifo(p) => p,
            Self::S3Fifo(p) => p,
            Self::Lru(p) => p,
            Self::Lfu(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EvictionPolicy {
        match self {
            Self::Fifo(p) => p,
            Self::S3Fifo(p) => p,
            Self::Lru(p) => p,
            Self::Lfu(p) => p,
        }
    }
}

impl EvictionPolicy for ShardPolicy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    #[inline]
    fn on_insert(&mut self, slot: SlotId, hash: u64) {
        self.inner_mut().on_insert(slot, hash);
    }

    #[inline]
    fn on_get(&mut self, slot: SlotId, hash: u64) {
        self.inner_mut().on_get(slot, hash);
    }

    #[inline]
    fn on_remove(&mut self, slot: SlotId) {
        self.inner_mut().on_remove(slot);
    }

    fn evict_if_over_capacity(&mut self, evicted: &mut Vec<SlotId>) {
        self.inner_mut().evict_if_over_capacity(evicted);
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn capacity(&self) -> usize {
        self.inner().capacity()
    }

    fn contains(&self, slot: SlotId) -> bool {
        self.inner().contains(slot)
    }

    #[cfg(any(test, debug_assertions))]
    fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner().check_invariants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FifoConfig, LfuConfig, LruConfig, S3FifoConfig};

    fn all_configs() -> Vec<EvictionConfig> {
        vec![
            FifoConfig::default().into(),
            S3FifoConfig::default().into(),
            LruConfig::default().into(),
            LfuConfig::default().into(),
        ]
    }

    #[test]
    fn config_selects_policy() {
        let names: Vec<_> = all_configs()
            .iter()
            .map(|cfg| ShardPolicy::new(cfg, 8).name())
            .collect();
        assert_eq!(names, vec!["fifo", "s3fifo", "lru", "lfu"]);
    }

    #[test]
    fn every_policy_respects_capacity() {
        for cfg in all_configs() {
            let mut policy = ShardPolicy::new(&cfg, 8);
            let mut evicted = Vec::new();
            for i in 0..64 {
                policy.on_insert(SlotId(i), i as u64);
                if i % 3 == 0 {
                    policy.on_get(SlotId(i), i as u64);
                }
                policy.evict_if_over_capacity(&mut evicted);
                assert!(policy.len() <= 8, "{} over capacity", policy.name());
            }
            assert_eq!(evicted.len(), 56, "{}", policy.name());
            assert_eq!(policy.capacity(), 8);
            policy.check_invariants().unwrap();

            policy.clear();
            assert!(policy.is_empty());
        }
    }

    #[test]
    fn evicted_slots_are_forgotten() {
        for cfg in all_configs() {
            let mut policy = ShardPolicy::new(&cfg, 4);
            let mut evicted = Vec::new();
            for i in 0..16 {
                policy.on_insert(SlotId(i), i as u64);
                policy.evict_if_over_capacity(&mut evicted);
            }
            for slot in &evicted {
                assert!(!policy.contains(*slot), "{} kept {slot:?}", policy.name());
            }
        }
    }
}
