//! Least-Recently-Used eviction with a high-priority pool.
//!
//! The recency list is split into two segments. New entries start in
//! probation; a hit promotes them into the protected (high-priority) pool,
//! which is bounded by `high_priority_pool_ratio × capacity`. Victims come
//! from the probation tail first, so a burst of one-shot keys cannot flush
//! entries that were read again.
//!
//! ```text
//!   insert ──► PROBATION: [MRU] ◄──► ... ◄──► [LRU] ──► evict (first)
//!                  ▲                  │
//!        demote    │                  │ get
//!   (pool full)    │                  ▼
//!              PROTECTED: [MRU] ◄──► ... ◄──► [LRU] ──► evict (probation empty)
//! ```
//!
//! A pool ratio of `0.0` degenerates to plain LRU: every promotion is
//! demoted straight back to the probation head. A ratio of `1.0` lets the
//! pool grow to the whole shard; inserts still land in probation.

use crate::config::LruConfig;
use crate::ds::{IntrusiveList, SlotId, SlotTable};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Segment {
    Probation,
    Protected,
}

#[derive(Debug)]
struct Meta {
    segment: Segment,
    node: SlotId,
}

#[derive(Debug)]
pub struct LruPolicy {
    probation: IntrusiveList<SlotId>,
    protected: IntrusiveList<SlotId>,
    meta: SlotTable<Meta>,
    protected_cap: usize,
    capacity: usize,
}

impl LruPolicy {
    /// `config` must already be validated.
    pub fn new(capacity: usize, config: &LruConfig) -> Self {
        let protected_cap =
            ((capacity as f64 * config.high_priority_pool_ratio).floor() as usize).min(capacity);
        Self {
            probation: IntrusiveList::with_capacity(capacity),
            protected: IntrusiveList::with_capacity(protected_cap),
            meta: SlotTable::with_capacity(capacity),
            protected_cap,
            capacity,
        }
    }

    pub fn probation_len(&self) -> usize {
        self.probation.len()
    }

    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    pub fn protected_capacity(&self) -> usize {
        self.protected_cap
    }

    pub fn is_protected(&self, slot: SlotId) -> bool {
        self.meta
            .get(slot)
            .is_some_and(|meta| meta.segment == Segment::Protected)
    }

    /// Next victim: probation LRU, or protected LRU when probation is empty.
    pub fn peek_victim(&self) -> Option<SlotId> {
        self.probation
            .back()
            .or_else(|| self.protected.back())
            .copied()
    }

    fn promote(&mut self, slot: SlotId) {
        let Some(meta) = self.meta.get_mut(slot) else {
            return;
        };
        self.probation.remove(meta.node);
        meta.segment = Segment::Protected;
        meta.node = self.protected.push_front(slot);

        if self.protected.len() > self.protected_cap
            && let Some(demoted) = self.protected.pop_back()
            && let Some(meta) = self.meta.get_mut(demoted)
        {
            meta.segment = Segment::Probation;
            meta.node = self.probation.push_front(demoted);
        }
    }
}

impl EvictionPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn on_insert(&mut self, slot: SlotId, _hash: u64) {
        self.on_remove(slot);
        let node = self.probation.push_front(slot);
        self.meta.insert(
            slot,
            Meta {
                segment: Segment::Probation,
                node,
            },
        );
    }

    fn on_get(&mut self, slot: SlotId, _hash: u64) {
        let Some(&Meta { segment, node }) = self.meta.get(slot) else {
            return;
        };
        match segment {
            Segment::Probation => self.promote(slot),
            Segment::Protected => {
                self.protected.move_to_front(node);
            },
        }
    }

    fn on_remove(&mut self, slot: SlotId) {
        if let Some(meta) = self.meta.remove(slot) {
            match meta.segment {
                Segment::Probation => self.probation.remove(meta.node),
                Segment::Protected => self.protected.remove(meta.node),
            };
        }
    }

    fn evict_if_over_capacity(&mut self, evicted: &mut Vec<SlotId>) {
        while self.len() > self.capacity {
            let Some(slot) = self
                .probation
                .pop_back()
                .or_else(|| self.protected.pop_back())
            else {
                break;
            };
            self.meta.remove(slot);
            evicted.push(slot);
        }
    }

    fn clear(&mut self) {
        self.probation.clear();
        self.protected.clear();
        self.meta.clear();
    }

    fn len(&self) -> usize {
        self.probation.len() + self.protected.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn contains(&self, slot: SlotId) -> bool {
        self.meta.contains(slot)
    }

    #[cfg(any(test, debug_assertions))]
    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.meta.len() != self.len() {
            return Err(InvariantError::new(format!(
                "lru meta len {} != probation {} + protected {}",
                self.meta.len(),
                self.probation.len(),
                self.protected.len()
            )));
        }
        if self.protected.len() > self.protected_cap {
            return Err(InvariantError::new(format!(
                "lru protected len {} exceeds pool {}",
                self.protected.len(),
                self.protected_cap
            )));
        }
        for (slot, meta) in self.meta.iter() {
            let list = match meta.segment {
                Segment::Probation => &self.probation,
                Segment::Protected => &self.protected,
            };
            if list.get(meta.node) != Some(&slot) {
                return Err(InvariantError::new(format!(
                    "lru {slot:?} missing from {:?} segment",
                    meta.segment
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: usize) -> SlotId {
        SlotId(i)
    }

    fn policy(capacity: usize, ratio: f64) -> LruPolicy {
        LruPolicy::new(
            capacity,
            &LruConfig {
                high_priority_pool_ratio: ratio,
            },
        )
    }

    fn insert(policy: &mut LruPolicy, i: usize) -> Vec<SlotId> {
        let mut evicted = Vec::new();
        policy.on_insert(slot(i), i as u64);
        policy.evict_if_over_capacity(&mut evicted);
        evicted
    }

    // ==============================================
    // Basic Recency
    // ==============================================

    mod recency {
        use super::*;

        #[test]
        fn pool_capacity_is_floor_of_ratio() {
            assert_eq!(policy(10, 0.9).protected_capacity(), 9);
            assert_eq!(policy(10, 0.25).protected_capacity(), 2);
            assert_eq!(policy(10, 0.0).protected_capacity(), 0);
            assert_eq!(policy(10, 1.0).protected_capacity(), 10);
        }

        #[test]
        fn without_hits_evicts_oldest() {
            let mut p = policy(3, 0.5);
            let mut evicted = Vec::new();
            for i in 0..5 {
                evicted.extend(insert(&mut p, i));
            }
            assert_eq!(evicted, vec![slot(0), slot(1)]);
            assert_eq!(p.probation_len(), 3);
            p.check_invariants().unwrap();
        }

        #[test]
        fn zero_ratio_is_plain_lru() {
            let mut p = policy(2, 0.0);
            insert(&mut p, 0);
            insert(&mut p, 1);
            p.on_get(slot(0), 0);
            assert!(!p.is_protected(slot(0)));

            let evicted = insert(&mut p, 2);
            assert_eq!(evicted, vec![slot(1)]);
            p.check_invariants().unwrap();
        }
    }

    // ==============================================
    // High-Priority Pool
    // ==============================================

    mod priority_pool {
        use super::*;

        #[test]
        fn hit_promotes_to_protected() {
            let mut p = policy(4, 0.5);
            insert(&mut p, 0);
            p.on_get(slot(0), 0);
            assert!(p.is_protected(slot(0)));
            assert_eq!(p.protected_len(), 1);
            assert_eq!(p.probation_len(), 0);
        }

        #[test]
        fn protected_entry_survives_scan() {
            let mut p = policy(4, 0.5);
            for i in 0..4 {
                insert(&mut p, i);
            }
            p.on_get(slot(0), 0);

            let mut evicted = Vec::new();
            for i in 4..20 {
                evicted.extend(insert(&mut p, i));
            }
            assert!(p.contains(slot(0)));
            assert!(!evicted.contains(&slot(0)));
            assert_eq!(evicted.len(), 16);
            p.check_invariants().unwrap();
        }

        #[test]
        fn pool_overflow_demotes_lru_member() {
            let mut p = policy(4, 0.5);
            for i in 0..3 {
                insert(&mut p, i);
            }
            p.on_get(slot(0), 0);
            p.on_get(slot(1), 1);
            p.on_get(slot(2), 2);

            assert_eq!(p.protected_len(), 2);
            assert!(!p.is_protected(slot(0)));
            assert!(p.is_protected(slot(1)));
            assert!(p.is_protected(slot(2)));
            p.check_invariants().unwrap();

            // The demoted entry is still the oldest probation member.
            insert(&mut p, 3);
            assert_eq!(insert(&mut p, 4), vec![slot(0)]);
        }

        #[test]
        fn protected_hit_refreshes_position() {
            let mut p = policy(4, 1.0);
            for i in 0..3 {
                insert(&mut p, i);
                p.on_get(slot(i), i as u64);
            }
            p.on_get(slot(0), 0);

            // Pool overflow demotes 1, not 0, because 0 was just refreshed.
            insert(&mut p, 3);
            p.on_get(slot(3), 3);
            p.on_insert(slot(4), 4);
            p.on_get(slot(4), 4);
            assert_eq!(p.peek_victim(), Some(slot(1)));
            let mut evicted = Vec::new();
            p.evict_if_over_capacity(&mut evicted);
            assert_eq!(evicted, vec![slot(1)]);
            p.check_invariants().unwrap();
        }

        #[test]
        fn probation_evicted_before_protected() {
            let mut p = policy(2, 1.0);
            insert(&mut p, 0);
            p.on_get(slot(0), 0);
            insert(&mut p, 1);
            let evicted = insert(&mut p, 2);
            assert_eq!(evicted, vec![slot(1)]);
            assert!(p.contains(slot(0)));
        }
    }

    // ==============================================
    // Removal & Clear
    // ==============================================

    mod removal {
        use super::*;

        #[test]
        fn remove_from_both_segments() {
            let mut p = policy(4, 0.5);
            for i in 0..3 {
                insert(&mut p, i);
            }
            p.on_get(slot(1), 1);
            p.on_remove(slot(1));
            p.on_remove(slot(2));
            p.on_remove(slot(9));
            assert_eq!(p.len(), 1);
            assert_eq!(p.protected_len(), 0);
            p.check_invariants().unwrap();
        }

        #[test]
        fn clear_empties_both_segments() {
            let mut p = policy(4, 0.5);
            for i in 0..4 {
                insert(&mut p, i);
                p.on_get(slot(i), i as u64);
            }
            p.clear();
            assert!(p.is_empty());
            assert_eq!(p.peek_victim(), None);
            p.check_invariants().unwrap();
        }
    }

    // ==============================================
    // Property Tests
    // ==============================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_invariants_always_hold(
                capacity in 0usize..16,
                ratio in 0.0f64..=1.0,
                ops in prop::collection::vec((0u8..3, 0usize..32), 0..200)
            ) {
                let mut p = policy(capacity, ratio);
                let mut evicted = Vec::new();
                for (kind, i) in ops {
                    match kind {
                        0 => {
                            p.on_remove(slot(i));
                            p.on_insert(slot(i), i as u64);
                            p.evict_if_over_capacity(&mut evicted);
                        },
                        1 => p.on_get(slot(i), i as u64),
                        _ => p.on_remove(slot(i)),
                    }
                    prop_assert!(p.len() <= capacity);
                    prop_assert!(p.protected_len() <= p.protected_capacity());
                    prop_assert!(p.check_invariants().is_ok());
                }
            }
        }
    }
}
