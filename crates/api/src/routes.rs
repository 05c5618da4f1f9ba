use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use inventory_domain::{ColorAllocator, InventoryStore};
use inventory_infrastructure::{DatabaseManager, InventoryMetrics};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{
    colors::list_free_colors,
    health::health_check,
    hosts::{get_host_by_color, new_host},
    metrics::render_metrics,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<DatabaseManager>,
    pub store: InventoryStore,
    pub allocator: Arc<ColorAllocator>,
    /// 实例上记录颜色的标签名
    pub tag_key: String,
    pub metrics: InventoryMetrics,
    /// 未安装指标记录器时为 None
    pub metrics_handle: Option<PrometheusHandle>,
    pub metrics_path: String,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/new_host", post(new_host))
        .route("/v1/host/{color}", get(get_host_by_color))
        .route("/v1/colors", get(list_free_colors))
        .route(&metrics_path, get(render_metrics))
        .with_state(state)
}
