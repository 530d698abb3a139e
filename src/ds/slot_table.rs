//! Per-slot side table.
//!
//! Eviction policies attach metadata (queue node, frequency, fingerprint) to
//! entries they do not own. The shard's [`SlotArena`](crate::ds::SlotArena)
//! hands out dense indices, so the metadata lives in a `Vec` indexed by the
//! same [`SlotId`] rather than in a second hash map.

use crate::ds::PREALLOC_LIMIT;
use crate::ds::slot_arena::SlotId;

#[derive(Debug, Clone)]
pub struct SlotTable<T> {
    slots: Vec<Option<T>>,
    len: usize,
}

impl<T> SlotTable<T> {
    /// Reserves room for `capacity` ids, at most [`PREALLOC_LIMIT`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(PREALLOC_LIMIT)),
            len: 0,
        }
    }

    /// Stores `value` for `id`, returning the previous value if any.
    pub fn insert(&mut self, id: SlotId, value: T) -> Option<T> {
        let idx = id.index();
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        let old = self.slots[idx].replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let old = self.slots.get_mut(id.index())?.take();
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (SlotId(idx), value)))
    }
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
