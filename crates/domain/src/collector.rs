use async_trait::async_trait;
use inventory_core::InventoryResult;

use crate::entities::{ComputeInstance, NetworkSegment};

/// 云平台数据采集器
///
/// 每次调用返回一致的完整快照，或以单个 `ExternalSource` 错误整体失败。
#[async_trait]
pub trait InventoryCollector: Send + Sync {
    /// 采集器所属的云账户
    fn account_id(&self) -> &str;

    /// 运行中的实例
    async fn fetch_instances(&self, account_id: &str) -> InventoryResult<Vec<ComputeInstance>>;

    async fn fetch_segments(&self) -> InventoryResult<Vec<NetworkSegment>>;
}
