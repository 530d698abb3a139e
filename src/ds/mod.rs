//! Building blocks shared by the shards and the eviction policies.

pub mod count_min_sketch;
pub mod ghost_list;
pub mod intrusive_list;
pub mod shard;
pub mod slot_arena;
pub mod slot_table;

/// Most entries any structure reserves up front. Larger capacities grow on
/// demand, so a huge configured capacity costs nothing until it is used.
pub const PREALLOC_LIMIT: usize = 4096;

pub use count_min_sketch::CountMinSketch;
pub use ghost_list::GhostList;
pub use intrusive_list::IntrusiveList;
pub use shard::ShardSelector;
pub use slot_arena::{SlotArena, SlotId};
pub use slot_table::SlotTable;
