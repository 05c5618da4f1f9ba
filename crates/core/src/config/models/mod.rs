pub mod api_observability;
pub mod app_config;
pub mod collector;
pub mod colors;
pub mod database;
pub mod sync;

// Re-export main types for easier imports
pub use api_observability::{ApiConfig, LogFormat, ObservabilityConfig};
pub use app_config::AppConfig;
pub use collector::CollectorConfig;
pub use colors::ColorsConfig;
pub use database::DatabaseConfig;
pub use sync::SyncConfig;
