use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inventory_core::InventoryError;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源: {0}")]
    NotFound(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Inventory(err) => match err.original_error() {
                InventoryError::Validation(_) | InventoryError::AccountMismatch { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                }
                InventoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                InventoryError::PoolExhausted => (StatusCode::CONFLICT, "POOL_EXHAUSTED"),
                InventoryError::ExternalSource(_) => {
                    (StatusCode::BAD_GATEWAY, "EXTERNAL_SOURCE_ERROR")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let message = match &self {
            ApiError::Inventory(err) => err.user_message().to_string(),
            other => other.to_string(),
        };

        // 内部错误的细节只写日志
        let detail = if status.is_server_error() {
            error!("请求处理失败: {}", self);
            None
        } else {
            Some(self.to_string())
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "type": error_type,
                "code": status.as_u16(),
                "detail": detail,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_error_status_mapping() {
        let cases = [
            (
                InventoryError::validation_error("bad"),
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::not_found("子网", "subnet-9"),
                StatusCode::NOT_FOUND,
            ),
            (InventoryError::PoolExhausted, StatusCode::CONFLICT),
            (
                InventoryError::external_source("down"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                InventoryError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn test_bad_request_response() {
        let response =
            ApiError::BadRequest("primary_role 不能为空".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
