use std::sync::Arc;

use inventory_domain::{ColorAllocator, InventoryCollector, InventoryStore, ReconciliationEngine};
use inventory_infrastructure::InventoryMetrics;

/// 任务共享的外部句柄
///
/// 构造后不可变，同一个任务的每次执行共享同一份上下文。
pub struct JobContext {
    collector: Arc<dyn InventoryCollector>,
    store: InventoryStore,
    engine: ReconciliationEngine,
    allocator: Arc<ColorAllocator>,
    tag_key: String,
    metrics: InventoryMetrics,
}

impl JobContext {
    pub fn new(
        collector: Arc<dyn InventoryCollector>,
        store: InventoryStore,
        allocator: Arc<ColorAllocator>,
        tag_key: impl Into<String>,
    ) -> Self {
        let engine = ReconciliationEngine::new(&store);
        Self {
            collector,
            store,
            engine,
            allocator,
            tag_key: tag_key.into(),
            metrics: InventoryMetrics::new(),
        }
    }

    pub fn collector(&self) -> &dyn InventoryCollector {
        self.collector.as_ref()
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn allocator(&self) -> &ColorAllocator {
        &self.allocator
    }

    /// 实例上记录颜色的标签名
    pub fn tag_key(&self) -> &str {
        &self.tag_key
    }

    pub fn metrics(&self) -> &InventoryMetrics {
        &self.metrics
    }
}
