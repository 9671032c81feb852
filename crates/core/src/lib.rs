pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::entity::{Entity, EntityKind, RawLabel, TaggedToken};
pub use domain::intent::Intent;
pub use domain::inventory::{Batch, ExpiringBatch, InventoryItem, LowStockItem};
pub use domain::turn::Turn;
pub use errors::{ApplicationError, InterfaceError};
pub use store::{InventoryStore, StoreError};
