use axum::{extract::State, response::IntoResponse};

use crate::{error::ApiResult, response::success, routes::AppState};

/// 当前空闲的颜色，包括仍在闲置窗口内的颜色
pub async fn list_free_colors(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let colors = state.allocator.list_free().await?;
    state.metrics.update_free_colors(colors.len());
    Ok(success(colors))
}
