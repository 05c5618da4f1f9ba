pub mod colors;
pub mod health;
pub mod hosts;
pub mod metrics;
