//! Window-TinyLFU style eviction backed by a count-min sketch.
//!
//! Entries live in one of three regions. Frequencies are never stored per
//! entry; every decision asks the shard-wide [`CountMinSketch`] for an
//! estimate of the key's popularity.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                          LfuPolicy Layout                              │
//! │                                                                        │
//! │  WINDOW     cap × window_ratio        newly inserted keys              │
//! │  PROBATION  main_cap - protected_cap  keys that left the window        │
//! │  PROTECTED  cap × protected_ratio     keys hit while in probation      │
//! │                                                                        │
//! │  sketch: CountMinSketch   incremented on insert and on every hit       │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Flows
//!
//! ```text
//!   insert(k): WINDOW head, sketch += k
//!
//!   get(k):    sketch += k, then by region
//!     WINDOW     main has room              ─► PROBATION head
//!                est(k) ≥ est(probation LRU) ─► swap: k to PROBATION,
//!                                               victim to WINDOW head
//!                otherwise                  ─► refresh in WINDOW
//!     PROBATION  protected has room         ─► PROTECTED head
//!                est(k) ≥ est(protected LRU) ─► PROTECTED head,
//!                                               protected LRU to PROBATION
//!                otherwise                  ─► refresh in PROBATION
//!     PROTECTED                             ─► refresh in PROTECTED
//!
//!   evict (while len > capacity):
//!     candidate = WINDOW tail
//!     victim    = PROBATION tail, or PROTECTED tail if probation is empty
//!     est(victim) < est(candidate) ? evict victim : evict candidate
//!   then spill WINDOW overflow to the PROBATION head
//! ```
//!
//! The newest insert sits at the window head, so with a window of at least
//! one entry a fresh key is never the candidate it is judged against.

use crate::config::LfuConfig;
use crate::ds::{CountMinSketch, IntrusiveList, SlotId, SlotTable};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

/// Increments between sketch halvings, per tracked entry.
const DECAY_FACTOR: u64 = 10;
const MIN_DECAY_THRESHOLD: u64 = 16;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Region {
    Window,
    Probation,
    Protected,
}

#[derive(Copy, Clone, Debug)]
struct Meta {
    region: Region,
    node: SlotId,
    hash: u64,
}

#[derive(Debug)]
pub struct LfuPolicy {
    window: IntrusiveList<SlotId>,
    probation: IntrusiveList<SlotId>,
    protected: IntrusiveList<SlotId>,
    meta: SlotTable<Meta>,
    sketch: CountMinSketch,
    window_cap: usize,
    protected_cap: usize,
    main_cap: usize,
    capacity: usize,
}

impl LfuPolicy {
    /// Sizes the regions and the sketch. `config` must already be validated.
    pub fn new(capacity: usize, config: &LfuConfig) -> Self {
        let window_cap =
            ((capacity as f64 * config.window_capacity_ratio).floor() as usize).min(capacity);
        let main_cap = capacity - window_cap;
        let protected_cap =
            ((capacity as f64 * config.protected_capacity_ratio).floor() as usize).min(main_cap);
        let decay = (capacity as u64)
            .saturating_mul(DECAY_FACTOR)
            .max(MIN_DECAY_THRESHOLD);

        Self {
            window: IntrusiveList::with_capacity(window_cap.saturating_add(1)),
            probation: IntrusiveList::with_capacity(main_cap - protected_cap),
            protected: IntrusiveList::with_capacity(protected_cap),
            meta: SlotTable::with_capacity(capacity),
            sketch: CountMinSketch::new(config.cmsketch_eps, config.cmsketch_confidence, decay),
            window_cap,
            protected_cap,
            main_cap,
            capacity,
        }
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn window_capacity(&self) -> usize {
        self.window_cap
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

    pub fn main_capacity(&self) -> usize {
        self.main_cap
    }

    /// Sketch estimate for a key hash.
    pub fn frequency(&self, hash: u64) -> u8 {
        self.sketch.estimate(hash)
    }

    pub fn sketch(&self) -> &CountMinSketch {
        &self.sketch
    }

    pub fn in_window(&self, slot: SlotId) -> bool {
        self.region_of(slot) == Some(Region::Window)
    }

    pub fn in_protected(&self, slot: SlotId) -> bool {
        self.region_of(slot) == Some(Region::Protected)
    }

    fn region_of(&self, slot: SlotId) -> Option<Region> {
        self.meta.get(slot).map(|meta| meta.region)
    }

    fn list_mut(&mut self, region: Region) -> &mut IntrusiveList<SlotId> {
        match region {
            Region::Window => &mut self.window,
            Region::Probation => &mut self.probation,
            Region::Protected => &mut self.protected,
        }
    }

    fn estimate_slot(&self, slot: SlotId) -> u8 {
        self.meta
            .get(slot)
            .map_or(0, |meta| self.sketch.estimate(meta.hash))
    }

    /// Moves a tracked slot to the head of `to`.
    fn relocate(&mut self, slot: SlotId, to: Region) {
        let Some(meta) = self.meta.get(slot).copied() else {
            return;
        };
        self.list_mut(meta.region).remove(meta.node);
        let node = self.list_mut(to).push_front(slot);
        if let Some(meta) = self.meta.get_mut(slot) {
            meta.region = to;
            meta.node = node;
        }
    }

    fn refresh(&mut self, meta: Meta) {
        self.list_mut(meta.region).move_to_front(meta.node);
    }

    fn on_window_hit(&mut self, slot: SlotId, meta: Meta) {
        if self.probation.len() + self.protected.len() < self.main_cap {
            self.relocate(slot, Region::Probation);
            return;
        }
        match self.probation.back().copied() {
            Some(victim) if self.sketch.estimate(meta.hash) >= self.estimate_slot(victim) => {
                self.relocate(slot, Region::Probation);
                self.relocate(victim, Region::Window);
            },
            _ => self.refresh(meta),
        }
    }

    fn on_probation_hit(&mut self, slot: SlotId, meta: Meta) {
        if self.protected.len() < self.protected_cap {
            self.relocate(slot, Region::Protected);
            return;
        }
        match self.protected.back().copied() {
            Some(victim) if self.sketch.estimate(meta.hash) >= self.estimate_slot(victim) => {
                self.relocate(slot, Region::Protected);
                self.relocate(victim, Region::Probation);
            },
            _ => self.refresh(meta),
        }
    }

    fn evict_one(&mut self, evicted: &mut Vec<SlotId>) -> bool {
        let candidate = self.window.back().copied();
        let victim = self
            .probation
            .back()
            .or_else(|| self.protected.back())
            .copied();

        let slot = match (candidate, victim) {
            (None, None) => return false,
            (Some(candidate), None) => candidate,
            (None, Some(victim)) => victim,
            (Some(candidate), Some(victim)) => {
                if self.estimate_slot(victim) < self.estimate_slot(candidate) {
                    victim
                } else {
                    candidate
                }
            },
        };

        if let Some(meta) = self.meta.remove(slot) {
            self.list_mut(meta.region).remove(meta.node);
        }
        evicted.push(slot);
        true
    }
}

impl EvictionPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn on_insert(&mut self, slot: SlotId, hash: u64) {
        self.on_remove(slot);
        self.sketch.increment(hash);
        let node = self.window.push_front(slot);
        self.meta.insert(
            slot,
            Meta {
                region: Region::Window,
                node,
                hash,
            },
        );
    }

    fn on_get(&mut self, slot: SlotId, hash: u64) {
        let Some(meta) = self.meta.get(slot).copied() else {
            return;
        };
        self.sketch.increment(hash);
        match meta.region {
            Region::Window => self.on_window_hit(slot, meta),
            Region::Probation => self.on_probation_hit(slot, meta),
            Region::Protected => self.refresh(meta),
        }
    }

    fn on_remove(&mut self, slot: SlotId) {
        if let Some(meta) = self.meta.remove(slot) {
            self.list_mut(meta.region).remove(meta.node);
        }
    }

    fn evict_if_over_capacity(&mut self, evicted: &mut Vec<SlotId>) {
        while self.len() > self.capacity {
            if !self.evict_one(evicted) {
                break;
            }
        }
        while self.window.len() > self.window_cap {
            let Some(&spill) = self.window.back() else {
                break;
            };
            self.relocate(spill, Region::Probation);
        }
    }

    fn clear(&mut self) {
        self.window.clear();
        self.probation.clear();
        self.protected.clear();
        self.meta.clear();
        self.sketch.clear();
    }

    fn len(&self) -> usize {
        self.window.len() + self.probation.len() + self.protected.len()
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
                "lfu meta len {} != window {} + probation {} + protected {}",
                self.meta.len(),
                self.window.len(),
                self.probation.len(),
                self.protected.len()
            )));
        }
        if self.protected.len() > self.protected_cap {
            return Err(InvariantError::new(format!(
                "lfu protected len {} exceeds {}",
                self.protected.len(),
                self.protected_cap
            )));
        }
        for (slot, meta) in self.meta.iter() {
            let list = match meta.region {
                Region::Window => &self.window,
                Region::Probation => &self.probation,
                Region::Protected => &self.protected,
            };
            if list.get(meta.node) != Some(&slot) {
                return Err(InvariantError::new(format!(
                    "lfu {slot:?} missing from {:?} region",
                    meta.region
                )));
            }
        }
        Ok(())
    }
}
