//! # Inventory API
//!
//! 库存服务的HTTP接口，基于Axum构建。
//!
//! ## API 端点
//!
//! - `GET /health` - 存活及数据库健康检查
//! - `POST /v1/new_host` - 为新主机分配颜色并生成标签
//! - `GET /v1/host/{color}` - 按颜色查询主机标签
//! - `GET /v1/colors` - 当前空闲的颜色
//! - `GET /metrics` - Prometheus 指标（路径可配置）
//!
//! 错误统一返回 `{"error": {"message", "type", "code", "detail", "timestamp"}}`。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::time::Duration;

use axum::Router;
use inventory_core::ApiConfig;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use middleware::{cors_layer, request_logging, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建带中间件的完整应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    let app = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging))
            .layer(TimeoutLayer::new(Duration::from_secs(
                api_config.request_timeout_seconds,
            ))),
    );

    if api_config.cors_enabled {
        app.layer(cors_layer())
    } else {
        app
    }
}
