//! # Eviction policy capability
//!
//! A shard stores its entries in a [`SlotArena`](crate::ds::SlotArena) and
//! indexes them by key. The eviction policy never sees keys or values: it
//! receives the entry's [`SlotId`] and the key's 64-bit hash, keeps its own
//! queues of slot ids, and names victims when the shard is over capacity.
//!
//! ```text
//!   ┌──────────────────────────── Shard ─────────────────────────────┐
//!   │                                                                 │
//!   │  index: FxHashMap<K, SlotId>     entries: SlotArena<Slot<K,V>>  │
//!   │            │                                 ▲                  │
//!   │            └──────────── SlotId ─────────────┘                  │
//!   │                            │                                    │
//!   │                            ▼                                    │
//!   │     policy: ShardPolicy (Fifo | S3Fifo | Lru | Lfu)             │
//!   │   on_insert / on_get / on_remove / evict_if_over_capacity       │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//!
//! | Call                       | Shard guarantees                               |
//! |----------------------------|------------------------------------------------|
//! | `on_insert(slot, hash)`    | `slot` is new to the policy                    |
//! | `on_get(slot, hash)`       | `slot` is tracked by the policy                |
//! | `on_remove(slot)`          | called for explicit removal and overwrite      |
//! | `evict_if_over_capacity`   | called after every insert                      |
//!
//! A slot reported through `evict_if_over_capacity` is already forgotten by
//! the policy; the shard then drops it from the index and the arena. After
//! the call `len() <= capacity()`.

use crate::ds::SlotId;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;

/// Bookkeeping interface implemented once per eviction algorithm.
pub trait EvictionPolicy: Send + Sync {
    /// Short policy name used in logs.
    fn name(&self) -> &'static str;

    /// Starts tracking a newly stored entry.
    fn on_insert(&mut self, slot: SlotId, hash: u64);

    /// Records a hit on a tracked entry.
    fn on_get(&mut self, slot: SlotId, hash: u64);

    /// Stops tracking an entry without treating it as an eviction.
    fn on_remove(&mut self, slot: SlotId);

    /// Pushes victims onto `evicted` until `len() <= capacity()`.
    fn evict_if_over_capacity(&mut self, evicted: &mut Vec<SlotId>);

    /// Forgets every entry and all auxiliary state (ghosts, frequencies).
    fn clear(&mut self);

    /// Number of tracked entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries the policy keeps after eviction.
    fn capacity(&self) -> usize;

    /// Returns `true` if `slot` is tracked.
    fn contains(&self, slot: SlotId) -> bool;

    /// Validates queue links and per-slot metadata.
    #[cfg(any(test, debug_assertions))]
    fn check_invariants(&self) -> Result<(), InvariantError>;
}
