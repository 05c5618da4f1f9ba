//! 事务辅助函数
//!
//! sqlx 的 `Transaction` 在析构时自动回滚；错误路径上仍显式回滚，
//! 以便回滚失败能与原始错误一起上报而不是被吞掉。

use inventory_core::{InventoryError, InventoryResult, TransactionStage};
use sqlx::{Database, Pool, Transaction};
use tracing::{error, warn};

pub async fn begin<DB: Database>(pool: &Pool<DB>) -> InventoryResult<Transaction<'static, DB>> {
    pool.begin()
        .await
        .map_err(|e| InventoryError::transaction(TransactionStage::Begin, e))
}

pub async fn commit<DB: Database>(tx: Transaction<'_, DB>) -> InventoryResult<()> {
    tx.commit()
        .await
        .map_err(|e| InventoryError::transaction(TransactionStage::Commit, e))
}

/// 回滚事务并返回触发回滚的错误
pub async fn rollback_with<DB: Database>(
    tx: Transaction<'_, DB>,
    cause: InventoryError,
) -> InventoryError {
    match tx.rollback().await {
        Ok(()) => {
            warn!("事务已回滚: {}", cause);
            cause
        }
        Err(rollback) => {
            error!("事务回滚失败: {}; 原始错误: {}", rollback, cause);
            InventoryError::RollbackFailed {
                original: Box::new(cause),
                rollback,
            }
        }
    }
}

/// 提交 `result` 为成功的事务，否则回滚
pub async fn finish<DB: Database, T>(
    tx: Transaction<'_, DB>,
    result: InventoryResult<T>,
) -> InventoryResult<T> {
    match result {
        Ok(value) => {
            commit(tx).await?;
            Ok(value)
        }
        Err(e) => Err(rollback_with(tx, e).await),
    }
}
