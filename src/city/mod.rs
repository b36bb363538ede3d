//! City layer - goods, buildable types, colonies and their build queues

pub mod build_queue;
pub mod buildable;
pub mod colony;
pub mod goods;

pub use build_queue::{BuildQueue, CompletionAction, ProductionInfo, ProductionStatus};
pub use buildable::{BuildableKind, BuildableType};
pub use colony::{Colony, NoBuildReason};
pub use goods::{AbstractGoods, GoodsType};
