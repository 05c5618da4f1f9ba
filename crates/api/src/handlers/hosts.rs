use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use inventory_core::InventoryError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::{ApiError, ApiResult},
    response::{created, success},
    routes::AppState,
};

/// 新主机的负责人在分配时尚未确定
const PENDING_OWNER: &str = "TBD";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewHostRequest {
    #[serde(default)]
    pub primary_role: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub subnet_id: String,
    #[serde(default)]
    pub pool: String,
}

impl NewHostRequest {
    pub fn validate(&self) -> ApiResult<()> {
        let fields = [
            ("primary_role", &self.primary_role),
            ("environment", &self.environment),
            ("subnet_id", &self.subnet_id),
            ("pool", &self.pool),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ApiError::BadRequest(format!("{name} 不能为空")));
            }
        }
        Ok(())
    }
}

/// 主机标签
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

fn initial(value: &str) -> String {
    value.chars().next().map(String::from).unwrap_or_default()
}

/// `{环境首字母}-{角色}-{池首字母}-{颜色}-{可用区后缀}`
pub fn host_name(request: &NewHostRequest, color: &str, az_suffix: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        initial(request.environment.trim()),
        request.primary_role.trim(),
        initial(request.pool.trim()),
        color,
        az_suffix
    )
}

/// 为新主机分配颜色并生成标签
#[instrument(skip_all)]
pub async fn new_host(
    State(state): State<AppState>,
    payload: Result<Json<NewHostRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let subnet_id = request.subnet_id.trim();
    let segment = state
        .store
        .segments
        .find_by_subnet_id(subnet_id)
        .await?
        .ok_or_else(|| InventoryError::not_found("子网", subnet_id))?;

    // 可用区不合法时不能占用颜色
    let az_suffix = segment
        .az_suffix()
        .ok_or_else(|| {
            InventoryError::validation_error(format!(
                "子网 {} 的可用区格式无效: {:?}",
                segment.subnet_id, segment.availability_zone
            ))
        })?
        .to_string();

    let color = match state.allocator.allocate().await {
        Ok(token) => {
            state.metrics.record_allocation(&token.name);
            token.name
        }
        Err(e) => {
            if matches!(e, InventoryError::PoolExhausted) {
                state.metrics.record_pool_exhausted();
            }
            return Err(e.into());
        }
    };

    let name = host_name(&request, &color, &az_suffix);
    info!("为新主机 {} 分配颜色 {}", name, color);

    Ok(created(HostTags {
        primary_role: Some(request.primary_role.trim().to_string()),
        environment: Some(request.environment.trim().to_string()),
        subnet_id: Some(segment.subnet_id),
        pool: Some(request.pool.trim().to_string()),
        color: Some(color),
        name: Some(name),
        owner: Some(PENDING_OWNER.to_string()),
    }))
}

/// 按颜色标签查询主机
pub async fn get_host_by_color(
    State(state): State<AppState>,
    Path(color): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let instance = state
        .store
        .instances
        .find_by_tag(&state.tag_key, &color)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("颜色为 {color} 的主机")))?;

    let tag = |key: &str| instance.tag(key).map(str::to_string);

    Ok(success(HostTags {
        primary_role: tag("role"),
        environment: tag("environment"),
        subnet_id: Some(instance.subnet_id.clone()),
        pool: None,
        color: tag(&state.tag_key),
        name: tag("Name"),
        owner: None,
    }))
}
