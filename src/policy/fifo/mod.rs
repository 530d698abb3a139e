//! First-In-First-Out eviction.
//!
//! Entries are evicted in insertion order. Reads never reorder. An overwrite
//! reaches the policy as `on_remove` + `on_insert`, so the key moves to the
//! newest position.
//!
//! ```text
//!   insert ──► [newest] ◄──► ... ◄──► [oldest] ──► evict
//!              front                  back
//! ```
//!
//! `remove` of an arbitrary entry is O(1): every entry's queue node id is
//! kept in a [`SlotTable`].

use crate::ds::{IntrusiveList, SlotId, SlotTable};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

#[derive(Debug)]
pub struct FifoPolicy {
    queue: IntrusiveList<SlotId>,
    nodes: SlotTable<SlotId>,
    capacity: usize,
}

impl FifoPolicy {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: IntrusiveList::with_capacity(capacity),
            nodes: SlotTable::with_capacity(capacity),
            capacity,
        }
    }

    /// Slot ids from newest to oldest.
    pub fn order(&self) -> Vec<SlotId> {
        self.queue.iter().copied().collect()
    }
}

impl EvictionPolicy for FifoPolicy {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn on_insert(&mut self, slot: SlotId, _hash: u64) {
        if let Some(old) = self.nodes.remove(slot) {
            self.queue.remove(old);
        }
        let node = self.queue.push_front(slot);
        self.nodes.insert(slot, node);
    }

    fn on_get(&mut self, _slot: SlotId, _hash: u64) {}

    fn on_remove(&mut self, slot: SlotId) {
        if let Some(node) = self.nodes.remove(slot) {
            self.queue.remove(node);
        }
    }

    fn evict_if_over_capacity(&mut self, evicted: &mut Vec<SlotId>) {
        while self.queue.len() > self.capacity {
            let Some(slot) = self.queue.pop_back() else {
                break;
            };
            self.nodes.remove(slot);
            evicted.push(slot);
        }
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.nodes.clear();
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn contains(&self, slot: SlotId) -> bool {
        self.nodes.contains(slot)
    }

    #[cfg(any(test, debug_assertions))]
    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.queue.len() != self.nodes.len() {
            return Err(InvariantError::new(format!(
                "fifo queue len {} != node table len {}",
                self.queue.len(),
                self.nodes.len()
            )));
        }
        for (slot, &node) in self.nodes.iter() {
            if self.queue.get(node) != Some(&slot) {
                return Err(InvariantError::new(format!(
                    "fifo node {node:?} does not point back to {slot:?}"
                )));
            }
        }
        Ok(())
    }
}
