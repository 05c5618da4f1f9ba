//! # Inventory Testing Utils
//!
//! Shared testing utilities for the inventory service workspace: in-memory
//! mocks of the repository and collector traits, entity builders, SQLite
//! helpers and a PostgreSQL test container.
//!
//! Add this crate as a dev-dependency and use it from a crate's `tests/`
//! directory:
//!
//! ```toml
//! [dev-dependencies]
//! inventory-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod containers;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use containers::*;
pub use helpers::*;
pub use mocks::*;
