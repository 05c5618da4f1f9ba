use std::fmt;

use thiserror::Error;

/// 事务所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStage {
    Begin,
    Commit,
    Rollback,
}

impl fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStage::Begin => write!(f, "开启"),
            TransactionStage::Commit => write!(f, "提交"),
            TransactionStage::Rollback => write!(f, "回滚"),
        }
    }
}

/// 清单服务错误类型定义
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("事务{stage}失败: {source}")]
    Transaction {
        stage: TransactionStage,
        #[source]
        source: sqlx::Error,
    },

    /// 回滚本身失败时同时保留触发回滚的原始错误
    #[error("事务回滚失败: {rollback}; 原始错误: {original}")]
    RollbackFailed {
        original: Box<InventoryError>,
        #[source]
        rollback: sqlx::Error,
    },

    #[error("数据验证失败: {0}")]
    Validation(String),

    #[error("账户不匹配: 子网 {subnet_id} 属于账户 {found}, 期望账户 {expected}")]
    AccountMismatch {
        expected: String,
        found: String,
        subnet_id: String,
    },

    #[error("外部数据源错误: {0}")]
    ExternalSource(String),

    #[error("颜色池已耗尽: 没有可分配的颜色")]
    PoolExhausted,

    #[error("{entity}未找到: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("调度器错误: {0}")]
    Scheduler(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl InventoryError {
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    pub fn external_source<S: Into<String>>(msg: S) -> Self {
        Self::ExternalSource(msg.into())
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_found<S: Into<String>>(entity: &'static str, id: S) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn transaction(stage: TransactionStage, source: sqlx::Error) -> Self {
        Self::Transaction { stage, source }
    }

    /// 批次在写入前被拒绝
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InventoryError::Validation(_) | InventoryError::AccountMismatch { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::NotFound { .. })
    }

    /// 回滚失败时返回触发回滚的原始错误
    pub fn original_error(&self) -> &InventoryError {
        match self {
            InventoryError::RollbackFailed { original, .. } => original.original_error(),
            other => other,
        }
    }

    /// 指标标签使用的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryError::Database(_) => "database",
            InventoryError::Transaction { .. } | InventoryError::RollbackFailed { .. } => {
                "transaction"
            }
            InventoryError::Validation(_) | InventoryError::AccountMismatch { .. } => "validation",
            InventoryError::ExternalSource(_) => "external_source",
            InventoryError::PoolExhausted => "pool_exhausted",
            InventoryError::NotFound { .. } => "not_found",
            InventoryError::Configuration(_) => "configuration",
            InventoryError::Scheduler(_) => "scheduler",
            InventoryError::Serialization(_) => "serialization",
            InventoryError::Internal(_) => "internal",
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            InventoryError::Validation(_) | InventoryError::AccountMismatch { .. } => {
                "输入数据验证失败"
            }
            InventoryError::NotFound { .. } => "请求的资源不存在",
            InventoryError::PoolExhausted => "没有可用的颜色，请稍后重试",
            InventoryError::ExternalSource(_) => "云平台数据获取失败，请稍后重试",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        InventoryError::Internal(err.to_string())
    }
}
