use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, database) = match state.database.health_check().await {
        Ok(()) => (StatusCode::OK, "ok".to_string()),
        Err(e) => {
            warn!("数据库健康检查失败: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, format!("error: {e}"))
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "database": database,
            "database_type": format!("{:?}", state.database.database_type()),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "inventory",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
