use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_core::InventoryResult;
use inventory_domain::{ColorRepository, ColorToken};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

use crate::database::{
    mapping::MappingHelpers,
    transaction::{begin, finish},
};

pub struct SqliteColorRepository {
    pool: SqlitePool,
}

impl SqliteColorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_missing(
        tx: &mut Transaction<'_, Sqlite>,
        names: &[String],
    ) -> InventoryResult<u64> {
        let mut inserted = 0;
        for name in names {
            let result = sqlx::query(
                "INSERT INTO colors (name, in_use, last_in_use) VALUES (?1, 0, ?2) ON CONFLICT (name) DO NOTHING",
            )
            .bind(name)
            .bind(DateTime::<Utc>::UNIX_EPOCH)
            .execute(&mut **tx)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn apply_observed(
        tx: &mut Transaction<'_, Sqlite>,
        observed: &[String],
        now: DateTime<Utc>,
    ) -> InventoryResult<u64> {
        sqlx::query("UPDATE colors SET in_use = 0 WHERE in_use = 1")
            .execute(&mut **tx)
            .await?;

        let mut marked = 0;
        for name in observed {
            let result =
                sqlx::query("UPDATE colors SET in_use = 1, last_in_use = ?2 WHERE name = ?1")
                    .bind(name)
                    .bind(now)
                    .execute(&mut **tx)
                    .await?;
            marked += result.rows_affected();
        }
        Ok(marked)
    }
}

#[async_trait]
impl ColorRepository for SqliteColorRepository {
    #[instrument(skip(self, names), fields(count = names.len()))]
    async fn seed(&self, names: &[String]) -> InventoryResult<u64> {
        let mut tx = begin(&self.pool).await?;
        let result = Self::insert_missing(&mut tx, names).await;
        finish(tx, result).await
    }

    async fn find_all(&self) -> InventoryResult<Vec<ColorToken>> {
        let rows = sqlx::query("SELECT name, in_use, last_in_use FROM colors ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(MappingHelpers::color_from_sqlite).collect()
    }

    async fn find_by_name(&self, name: &str) -> InventoryResult<Option<ColorToken>> {
        let row = sqlx::query("SELECT name, in_use, last_in_use FROM colors WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(MappingHelpers::color_from_sqlite).transpose()
    }

    async fn find_free(&self) -> InventoryResult<Vec<ColorToken>> {
        let rows = sqlx::query(
            "SELECT name, in_use, last_in_use FROM colors WHERE in_use = 0 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(MappingHelpers::color_from_sqlite).collect()
    }

    async fn try_claim(
        &self,
        name: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> InventoryResult<bool> {
        // 快照之后颜色可能被占用又释放，条件中重新检查闲置时间
        let result = sqlx::query(
            "UPDATE colors SET in_use = 1, last_in_use = ?2 \
             WHERE name = ?1 AND in_use = 0 AND last_in_use < ?3",
        )
        .bind(name)
        .bind(now)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        let claimed = result.rows_affected() == 1;
        debug!("claim {}: {}", name, claimed);
        Ok(claimed)
    }

    async fn mark_used(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool> {
        let result = sqlx::query("UPDATE colors SET in_use = 1, last_in_use = ?2 WHERE name = ?1")
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, name: &str, now: DateTime<Utc>) -> InventoryResult<bool> {
        let result = sqlx::query("UPDATE colors SET in_use = 0, last_in_use = ?2 WHERE name = ?1")
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, observed), fields(observed = observed.len()))]
    async fn resync(&self, observed: &[String], now: DateTime<Utc>) -> InventoryResult<u64> {
        let mut tx = begin(&self.pool).await?;
        let result = Self::apply_observed(&mut tx, observed, now).await;
        finish(tx, result).await
    }
}
