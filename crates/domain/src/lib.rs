pub mod collector;
pub mod colors;
pub mod entities;
pub mod reconcile;
pub mod repositories;

pub use collector::*;
pub use colors::*;
pub use entities::*;
pub use inventory_core::{InventoryError, InventoryResult};
pub use reconcile::*;
pub use repositories::*;
