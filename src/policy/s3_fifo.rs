//! S3-FIFO (Simple, Scalable, Scan-resistant FIFO) eviction.
//!
//! Three FIFO queues give scan resistance without LRU reordering on reads.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                         S3FifoPolicy Layout                              │
//! │                                                                          │
//! │   meta: SlotTable<Meta>          Meta { queue, node, freq, hash }        │
//! │                                                                          │
//! │   SMALL: head ──► ... ──► tail   new keys, small_cap = cap × small_ratio │
//! │   MAIN:  head ──► ... ──► tail   proven keys, main_cap = cap - small_cap │
//! │   GHOST: GhostList<u64>          hashes of keys evicted from SMALL       │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Flows
//!
//! ```text
//!   insert(k):  hash(k) ∈ GHOST ? ─yes─► MAIN head (ghost entry dropped)
//!                                 └no──► SMALL head
//!   get(k):     freq = min(freq + 1, max_freq)
//!
//!   evict (while len > capacity):
//!     SMALL over its share, or MAIN empty:
//!       pop SMALL tail ─ freq ≥ threshold ─► MAIN head, freq = 0
//!                      │                     (MAIN over share ⇒ evict MAIN)
//!                      └ otherwise ────────► record hash in GHOST, evict
//!     else:
//!       pop MAIN tail ── freq > 0 ─► freq -= 1, back to MAIN head
//!                     └─ freq = 0 ─► evict
//! ```
//!
//! Frequencies saturate at `max(3, small_to_main_freq_threshold)` so a
//! threshold above the classic 2-bit counter is still reachable.

use crate::config::S3FifoConfig;
use crate::ds::{GhostList, IntrusiveList, SlotId, SlotTable};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

/// Lowest frequency cap (2 bits = 0-3).
const MIN_MAX_FREQ: u32 = 3;

/// Which queue a tracked entry belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum QueueKind {
    Small,
    Main,
}

#[derive(Debug)]
struct Meta {
    queue: QueueKind,
    node: SlotId,
    freq: u32,
    hash: u64,
}

/// Counters describing where S3-FIFO found its victims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct S3FifoStats {
    /// Entries evicted from the small queue (fingerprint kept in ghost).
    pub small_evictions: u64,
    /// Entries evicted from the main queue.
    pub main_evictions: u64,
    /// Small-queue entries moved to main instead of being evicted.
    pub promotions: u64,
    /// Main-queue entries given a second chance.
    pub main_reinserts: u64,
    /// Inserts admitted straight to main because of a ghost hit.
    pub ghost_hits: u64,
}

#[derive(Debug)]
pub struct S3FifoPolicy {
    small: IntrusiveList<SlotId>,
    main: IntrusiveList<SlotId>,
    ghost: GhostList<u64>,
    meta: SlotTable<Meta>,
    small_cap: usize,
    main_cap: usize,
    capacity: usize,
    threshold: u32,
    max_freq: u32,
    stats: S3FifoStats,
}

impl S3FifoPolicy {
    /// Sizes the queues from `capacity`. `config` must already be validated.
    pub fn new(capacity: usize, config: &S3FifoConfig) -> Self {
        let small_cap = share(capacity, config.small_queue_capacity_ratio);
        let ghost_cap = (capacity as f64 * config.ghost_queue_capacity_ratio).round() as usize;
        let threshold = config.small_to_main_freq_threshold.max(1);

        Self {
            small: IntrusiveList::with_capacity(small_cap),
            main: IntrusiveList::with_capacity(capacity - small_cap),
            ghost: GhostList::new(ghost_cap),
            meta: SlotTable::with_capacity(capacity),
            small_cap,
            main_cap: capacity - small_cap,
            capacity,
            threshold,
            max_freq: threshold.max(MIN_MAX_FREQ),
            stats: S3FifoStats::default(),
        }
    }

    pub fn small_len(&self) -> usize {
        self.small.len()
    }

    pub fn small_capacity(&self) -> usize {
        self.small_cap
    }

    pub fn main_len(&self) -> usize {
        self.main.len()
    }

    pub fn main_capacity(&self) -> usize {
        self.main_cap
    }

    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    pub fn ghost_capacity(&self) -> usize {
        self.ghost.capacity()
    }

    pub fn stats(&self) -> S3FifoStats {
        self.stats
    }

    /// Current access frequency of `slot`, if tracked.
    pub fn frequency(&self, slot: SlotId) -> Option<u32> {
        self.meta.get(slot).map(|meta| meta.freq)
    }

    /// Returns `true` if `slot` sits in the main queue.
    pub fn in_main(&self, slot: SlotId) -> bool {
        self.meta
            .get(slot)
            .is_some_and(|meta| meta.queue == QueueKind::Main)
    }

    fn evict_one(&mut self, evicted: &mut Vec<SlotId>) {
        if (self.small.len() > self.small_cap || self.main.is_empty()) && self.evict_small(evicted)
        {
            return;
        }
        self.evict_main(evicted);
    }

    /// Drains the small queue tail until one entry is evicted (here, or from
    /// main after a promotion overflows it). Returns `false` if small ran dry.
    fn evict_small(&mut self, evicted: &mut Vec<SlotId>) -> bool {
        while let Some(slot) = self.small.pop_back() {
            let Some(meta) = self.meta.get_mut(slot) else {
                continue;
            };

            if meta.freq >= self.threshold {
                meta.freq = 0;
                meta.queue = QueueKind::Main;
                meta.node = self.main.push_front(slot);
                self.stats.promotions += 1;
                if self.main.len() > self.main_cap && self.evict_main(evicted) {
                    return true;
                }
            } else {
                let hash = meta.hash;
                self.meta.remove(slot);
                self.ghost.record(hash);
                self.stats.small_evictions += 1;
                evicted.push(slot);
                return true;
            }
        }
        false
    }

    /// Second-chance scan of the main queue. Returns `false` if main is empty.
    fn evict_main(&mut self, evicted: &mut Vec<SlotId>) -> bool {
        while let Some(slot) = self.main.pop_back() {
            let Some(meta) = self.meta.get_mut(slot) else {
                continue;
            };

            if meta.freq > 0 {
                meta.freq -= 1;
                meta.node = self.main.push_front(slot);
                self.stats.main_reinserts += 1;
            } else {
                self.meta.remove(slot);
                self.stats.main_evictions += 1;
                evicted.push(slot);
                return true;
            }
        }
        false
    }
}

impl EvictionPolicy for S3FifoPolicy {
    fn name(&self) -> &'static str {
        "s3fifo"
    }

    fn on_insert(&mut self, slot: SlotId, hash: u64) {
        self.on_remove(slot);

        let queue = if self.ghost.remove(&hash) {
            self.stats.ghost_hits += 1;
            tracing::trace!(hash, "s3fifo ghost hit, admitting to main");
            QueueKind::Main
        } else {
            QueueKind::Small
        };
        let node = match queue {
            QueueKind::Small => self.small.push_front(slot),
            QueueKind::Main => self.main.push_front(slot),
        };
        self.meta.insert(
            slot,
            Meta {
                queue,
                node,
                freq: 0,
                hash,
            },
        );
    }

    fn on_get(&mut self, slot: SlotId, _hash: u64) {
        if let Some(meta) = self.meta.get_mut(slot) {
            meta.freq = (meta.freq + 1).min(self.max_freq);
        }
    }

    fn on_remove(&mut self, slot: SlotId) {
        if let Some(meta) = self.meta.remove(slot) {
            match meta.queue {
                QueueKind::Small => self.small.remove(meta.node),
                QueueKind::Main => self.main.remove(meta.node),
            };
        }
    }

    fn evict_if_over_capacity(&mut self, evicted: &mut Vec<SlotId>) {
        while self.len() > self.capacity {
            let before = evicted.len();
            self.evict_one(evicted);
            if evicted.len() == before {
                break;
            }
        }
    }

    fn clear(&mut self) {
        self.small.clear();
        self.main.clear();
        self.ghost.clear();
        self.meta.clear();
    }

    fn len(&self) -> usize {
        self.small.len() + self.main.len()
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
                "s3fifo meta len {} != small {} + main {}",
                self.meta.len(),
                self.small.len(),
                self.main.len()
            )));
        }
        for (slot, meta) in self.meta.iter() {
            let queue = match meta.queue {
                QueueKind::Small => &self.small,
                QueueKind::Main => &self.main,
            };
            if queue.get(meta.node) != Some(&slot) {
                return Err(InvariantError::new(format!(
                    "s3fifo {slot:?} not found in {:?} queue",
                    meta.queue
                )));
            }
            if meta.freq > self.max_freq {
                return Err(InvariantError::new(format!(
                    "s3fifo {slot:?} freq {} above cap {}",
                    meta.freq, self.max_freq
                )));
            }
        }
        if self.ghost.len() > self.ghost.capacity() {
            return Err(InvariantError::new("s3fifo ghost list over capacity"));
        }
        Ok(())
    }
}

/// `round(capacity × ratio)`, never more than `capacity`.
fn share(capacity: usize, ratio: f64) -> usize {
    ((capacity as f64 * ratio).round() as usize).min(capacity)
}
