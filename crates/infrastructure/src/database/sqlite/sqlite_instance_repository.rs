use async_trait::async_trait;
use inventory_core::InventoryResult;
use inventory_domain::{ComputeInstance, InstanceRepository};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

use crate::database::{
    mapping::MappingHelpers,
    transaction::{begin, finish},
};

const UPSERT_INSTANCE: &str = r#"
    INSERT INTO ec2_instances (instance_id, account_id, subnet_id, tags)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT (instance_id, account_id)
    DO UPDATE SET tags = excluded.tags
"#;

pub struct SqliteInstanceRepository {
    pool: SqlitePool,
}

impl SqliteInstanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn write_instances(
        tx: &mut Transaction<'_, Sqlite>,
        instances: &[ComputeInstance],
    ) -> InventoryResult<()> {
        for instance in instances {
            sqlx::query(UPSERT_INSTANCE)
                .bind(&instance.instance_id)
                .bind(&instance.account_id)
                .bind(&instance.subnet_id)
                .bind(MappingHelpers::tags_to_text(&instance.tags)?)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl InstanceRepository for SqliteInstanceRepository {
    #[instrument(skip(self, instances), fields(count = instances.len()))]
    async fn upsert_all(&self, instances: &[ComputeInstance]) -> InventoryResult<()> {
        let mut tx = begin(&self.pool).await?;
        let result = Self::write_instances(&mut tx, instances).await;
        finish(tx, result).await?;

        debug!("合并了 {} 个实例", instances.len());
        Ok(())
    }

    async fn find_by_tag(
        &self,
        key: &str,
        value: &str,
    ) -> InventoryResult<Option<ComputeInstance>> {
        let row = sqlx::query(
            r#"
            SELECT instance_id, account_id, subnet_id, tags FROM ec2_instances
            WHERE json_extract(tags, '$."' || ?1 || '"') = ?2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(MappingHelpers::instance_from_sqlite).transpose()
    }

    async fn find_all(&self) -> InventoryResult<Vec<ComputeInstance>> {
        let rows = sqlx::query(
            "SELECT instance_id, account_id, subnet_id, tags FROM ec2_instances ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(MappingHelpers::instance_from_sqlite).collect()
    }
}
