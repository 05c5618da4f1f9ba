pub mod manager;
pub mod mapping;
pub mod postgres;
pub mod sqlite;
pub mod transaction;

pub use manager::{DatabaseManager, DatabasePool, DatabaseType};
pub use postgres::{PostgresColorRepository, PostgresInstanceRepository, PostgresSegmentRepository};
pub use sqlite::{SqliteColorRepository, SqliteInstanceRepository, SqliteSegmentRepository};
