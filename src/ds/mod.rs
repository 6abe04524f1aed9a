pub mod intrusive_list;
pub mod shard;
pub mod slot_arena;

pub use intrusive_list::{IntrusiveList, Position};
pub use shard::ShardSelector;
pub use slot_arena::{SlotArena, SlotId};
