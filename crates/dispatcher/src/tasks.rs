use std::time::Instant;

use async_trait::async_trait;
use inventory_core::InventoryResult;
use inventory_domain::ComputeInstance;
use tracing::{info, instrument};

use crate::context::JobContext;
use crate::scheduler::JobTask;

/// 提取实例上的颜色标签值，缺少该标签的实例被跳过
pub fn colors_from_tags(instances: &[ComputeInstance], tag_key: &str) -> Vec<String> {
    instances
        .iter()
        .filter_map(|instance| instance.tag(tag_key))
        .map(str::to_string)
        .collect()
}

/// 子网整体替换同步
pub struct PopulateSubnets;

impl PopulateSubnets {
    pub const NAME: &'static str = "populate_subnets";

    async fn sync(context: &JobContext) -> InventoryResult<usize> {
        let segments = context.collector().fetch_segments().await?;
        context
            .engine()
            .replace_sync(context.collector().account_id(), &segments)
            .await?;
        Ok(segments.len())
    }
}

#[async_trait]
impl JobTask for PopulateSubnets {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(job = "populate_subnets"))]
    async fn run(&self, context: &JobContext) -> InventoryResult<()> {
        let start = Instant::now();
        match Self::sync(context).await {
            Ok(rows) => {
                context
                    .metrics()
                    .record_sync(Self::NAME, rows, start.elapsed().as_secs_f64());
                Ok(())
            }
            Err(e) => {
                context.metrics().record_sync_failure(Self::NAME, e.kind());
                Err(e)
            }
        }
    }
}

/// 实例合并同步，随后以实例标签为准重新同步颜色占用
pub struct PopulateInstances;

impl PopulateInstances {
    pub const NAME: &'static str = "populate_instances";

    async fn sync(context: &JobContext) -> InventoryResult<usize> {
        let account_id = context.collector().account_id();
        let instances = context.collector().fetch_instances(account_id).await?;
        context.engine().upsert_sync(&instances).await?;

        let observed = colors_from_tags(&instances, context.tag_key());
        info!(
            "{} 个实例中有 {} 个带颜色标签",
            instances.len(),
            observed.len()
        );
        context.allocator().resync_from_observed(&observed).await?;

        Ok(instances.len())
    }
}

#[async_trait]
impl JobTask for PopulateInstances {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(job = "populate_instances"))]
    async fn run(&self, context: &JobContext) -> InventoryResult<()> {
        let start = Instant::now();
        match Self::sync(context).await {
            Ok(rows) => {
                context
                    .metrics()
                    .record_sync(Self::NAME, rows, start.elapsed().as_secs_f64());
                Ok(())
            }
            Err(e) => {
                context.metrics().record_sync_failure(Self::NAME, e.kind());
                Err(e)
            }
        }
    }
}
