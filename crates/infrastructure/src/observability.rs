use anyhow::Result;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, info, warn};

/// 安装全局 Prometheus 记录器，返回用于渲染指标的句柄
///
/// 进程内只能安装一次。
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// 库存服务指标
///
/// 未安装记录器时所有操作都是空操作。
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryMetrics;

impl InventoryMetrics {
    pub fn new() -> Self {
        Self
    }

    /// 记录一次成功的同步
    pub fn record_sync(&self, job: &str, rows: usize, duration_seconds: f64) {
        counter!("inventory_sync_runs_total", "job" => job.to_string()).increment(1);
        counter!("inventory_sync_rows_total", "job" => job.to_string()).increment(rows as u64);
        histogram!("inventory_sync_duration_seconds", "job" => job.to_string())
            .record(duration_seconds);

        debug!(
            job = job,
            rows = rows,
            duration_seconds = duration_seconds,
            "Sync completed"
        );
    }

    pub fn record_sync_failure(&self, job: &str, error_type: &str) {
        counter!(
            "inventory_sync_failures_total",
            "job" => job.to_string(),
            "error" => error_type.to_string()
        )
        .increment(1);

        warn!(job = job, error_type = error_type, "Sync failed");
    }

    pub fn record_allocation(&self, color: &str) {
        counter!("inventory_color_allocations_total").increment(1);
        debug!(color = color, "Color allocated");
    }

    pub fn record_pool_exhausted(&self) {
        counter!("inventory_color_pool_exhausted_total").increment(1);
    }

    pub fn update_free_colors(&self, count: usize) {
        gauge!("inventory_colors_free").set(count as f64);
    }
}
