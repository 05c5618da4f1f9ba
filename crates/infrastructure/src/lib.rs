pub mod collector;
pub mod database;
pub mod observability;

pub use collector::*;
pub use database::*;
pub use observability::*;
