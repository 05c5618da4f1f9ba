//! Test helper utilities and common testing patterns

use std::time::Duration;

use inventory_domain::InventoryStore;
use inventory_infrastructure::DatabaseManager;
use tokio::time::sleep;

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Wait for a condition to be true with timeout
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(50)).await;
        }

        false
    }
}

/// 已完成迁移的内存 SQLite 数据库
pub async fn sqlite_test_manager() -> anyhow::Result<DatabaseManager> {
    let manager = DatabaseManager::new("sqlite::memory:", 1).await?;
    manager.migrate().await?;
    Ok(manager)
}

/// 基于内存 SQLite 的存储，返回的管理器需保持存活
pub async fn sqlite_test_store() -> anyhow::Result<(DatabaseManager, InventoryStore)> {
    let manager = sqlite_test_manager().await?;
    let store = manager.store();
    Ok((manager, store))
}

pub fn palette(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
