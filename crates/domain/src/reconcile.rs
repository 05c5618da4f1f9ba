//! 对账引擎
//!
//! 两种同步策略:
//! - 子网使用整体替换（replace-sync），外部快照完全覆盖本地状态
//! - 实例使用按复合键合并（upsert-sync），从不删除本次未出现的实例

use std::sync::Arc;
use std::time::Instant;

use inventory_core::{InventoryError, InventoryResult};
use tracing::{info, instrument, warn};

use crate::entities::{ComputeInstance, NetworkSegment};
use crate::repositories::{InstanceRepository, InventoryStore, SegmentRepository};

/// 确认批次内每个子网都属于调用方账户，遇到第一个不匹配即返回
pub fn validate_segment_accounts(
    account_id: &str,
    segments: &[NetworkSegment],
) -> InventoryResult<()> {
    match segments.iter().find(|s| s.account_id != account_id) {
        Some(segment) => Err(InventoryError::AccountMismatch {
            expected: account_id.to_string(),
            found: segment.account_id.clone(),
            subnet_id: segment.subnet_id.clone(),
        }),
        None => Ok(()),
    }
}

pub struct ReconciliationEngine {
    segments: Arc<dyn SegmentRepository>,
    instances: Arc<dyn InstanceRepository>,
}

impl ReconciliationEngine {
    pub fn new(store: &InventoryStore) -> Self {
        Self {
            segments: store.segments.clone(),
            instances: store.instances.clone(),
        }
    }

    /// 用 `segments` 整体替换子网表
    ///
    /// 账户校验在任何写入之前完成；写入失败时回滚，表内容保持调用前的状态。
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    pub async fn replace_sync(
        &self,
        account_id: &str,
        segments: &[NetworkSegment],
    ) -> InventoryResult<()> {
        if let Err(e) = validate_segment_accounts(account_id, segments) {
            warn!("子网批次校验失败，放弃同步: {}", e);
            return Err(e);
        }

        let start = Instant::now();
        self.segments.replace_all(segments).await?;

        info!(
            "子网同步完成: 账户 {} 共 {} 个子网，耗时 {:?}",
            account_id,
            segments.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// 按 (instance_id, account_id) 合并实例
    #[instrument(skip(self, instances), fields(count = instances.len()))]
    pub async fn upsert_sync(&self, instances: &[ComputeInstance]) -> InventoryResult<()> {
        let start = Instant::now();
        self.instances.upsert_all(instances).await?;

        info!(
            "实例同步完成: 共 {} 个实例，耗时 {:?}",
            instances.len(),
            start.elapsed()
        );
        Ok(())
    }
}
