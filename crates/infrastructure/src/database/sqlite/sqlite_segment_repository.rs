use async_trait::async_trait;
use inventory_core::InventoryResult;
use inventory_domain::{NetworkSegment, SegmentRepository};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

use crate::database::{
    mapping::MappingHelpers,
    transaction::{begin, finish},
};

const INSERT_SUBNET: &str = r#"
    INSERT INTO subnets (vpc_id, subnet_id, availability_zone, account_id, tags)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub struct SqliteSegmentRepository {
    pool: SqlitePool,
}

impl SqliteSegmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn write_segments(
        tx: &mut Transaction<'_, Sqlite>,
        segments: &[NetworkSegment],
    ) -> InventoryResult<()> {
        // SQLite 没有 TRUNCATE，删除全部行并重置 AUTOINCREMENT 序列
        sqlx::query("DELETE FROM subnets").execute(&mut **tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'subnets'")
            .execute(&mut **tx)
            .await?;

        for segment in segments {
            sqlx::query(INSERT_SUBNET)
                .bind(&segment.vpc_id)
                .bind(&segment.subnet_id)
                .bind(&segment.availability_zone)
                .bind(&segment.account_id)
                .bind(MappingHelpers::tags_to_text(&segment.tags)?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl SegmentRepository for SqliteSegmentRepository {
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    async fn replace_all(&self, segments: &[NetworkSegment]) -> InventoryResult<()> {
        let mut tx = begin(&self.pool).await?;
        let result = Self::write_segments(&mut tx, segments).await;
        finish(tx, result).await?;

        debug!("子网表已替换为 {} 行", segments.len());
        Ok(())
    }

    async fn find_by_subnet_id(&self, subnet_id: &str) -> InventoryResult<Option<NetworkSegment>> {
        let row = sqlx::query(
            "SELECT subnet_id, vpc_id, availability_zone, account_id, tags FROM subnets WHERE subnet_id = ?1",
        )
        .bind(subnet_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(MappingHelpers::segment_from_sqlite).transpose()
    }

    async fn find_all(&self) -> InventoryResult<Vec<NetworkSegment>> {
        let rows = sqlx::query(
            "SELECT subnet_id, vpc_id, availability_zone, account_id, tags FROM subnets ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(MappingHelpers::segment_from_sqlite).collect()
    }
}
