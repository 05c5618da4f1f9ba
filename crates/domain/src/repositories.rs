//! 领域仓储抽象
//!
//! 每类实体一个仓储接口，由基础设施层按数据库类型实现。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_core::InventoryResult;

use crate::entities::{ColorToken, ComputeInstance, NetworkSegment};

/// 子网仓储抽象
#[async_trait]
pub trait SegmentRepository: Send + Sync {
    /// 在单个事务内清空子网表、重置自增序列并写入全部子网
    async fn replace_all(&self, segments: &[NetworkSegment]) -> InventoryResult<()>;
    async fn find_by_subnet_id(&self, subnet_id: &str) -> InventoryResult<Option<NetworkSegment>>;
    async fn find_all(&self) -> InventoryResult<Vec<NetworkSegment>>;
}

/// 实例仓储抽象
#[async_trait]
pub trait InstanceRepository: Send + Sync {
    /// 按 (instance_id, account_id) 插入或刷新标签，不删除未出现的实例
    async fn upsert_all(&self, instances: &[ComputeInstance]) -> InventoryResult<()>;
    async fn find_by_tag(&self, key: &str, value: &str)
        -> InventoryResult<Option<ComputeInstance>>;
    async fn find_all(&self) -> InventoryResult<Vec<ComputeInstance>>;
}

/// 颜色仓储抽象
#[async_trait]
pub trait ColorRepository: Send + Sync {
    /// 补齐缺失的颜色，返回新插入的数量
    async fn seed(&self, names: &[String]) -> InventoryResult<u64>;
    async fn find_all(&self) -> InventoryResult<Vec<ColorToken>>;
    async fn find_by_name(&self, name: &str) -> InventoryResult<Option<ColorToken>>;
    /// 所有空闲颜色，按名称排序
    async fn find_free(&self) -> InventoryResult<Vec<ColorToken>>;
    /// 仅当颜色仍空闲且最近一次使用早于 `cutoff` 时将其占用，返回是否占用成功
    async fn try_claim(
        &self,
        name: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> InventoryResult<bool>;
    /// 标记为占用并刷新时间戳，颜色不存在时返回 false
    async fn mark_used(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool>;
    /// 释放颜色，闲置计时从 `now` 开始
    async fn release(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool>;
    /// 单个事务内释放全部颜色再占用 `observed`，返回实际占用的数量
    async fn resync(&self, observed: &[String], now: DateTime<Utc>) -> InventoryResult<u64>;
}

/// 存储句柄，聚合各实体仓储
#[derive(Clone)]
pub struct InventoryStore {
    pub segments: Arc<dyn SegmentRepository>,
    pub instances: Arc<dyn InstanceRepository>,
    pub colors: Arc<dyn ColorRepository>,
}

impl InventoryStore {
    pub fn new(
        segments: Arc<dyn SegmentRepository>,
        instances: Arc<dyn InstanceRepository>,
        colors: Arc<dyn ColorRepository>,
    ) -> Self {
        Self {
            segments,
            instances,
            colors,
        }
    }
}
