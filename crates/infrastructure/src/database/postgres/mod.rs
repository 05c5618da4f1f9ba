pub mod postgres_color_repository;
pub mod postgres_instance_repository;
pub mod postgres_segment_repository;

pub use postgres_color_repository::PostgresColorRepository;
pub use postgres_instance_repository::PostgresInstanceRepository;
pub use postgres_segment_repository::PostgresSegmentRepository;

use inventory_core::InventoryResult;
use sqlx::PgPool;
use tracing::debug;

/// 运行PostgreSQL数据库迁移
pub async fn run_migrations(pool: &PgPool) -> InventoryResult<()> {
    debug!("Running PostgreSQL database migrations");

    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS subnets (
            id BIGSERIAL PRIMARY KEY,
            subnet_id VARCHAR(64) NOT NULL UNIQUE,
            vpc_id VARCHAR(64) NOT NULL,
            availability_zone VARCHAR(64) NOT NULL,
            account_id VARCHAR(32) NOT NULL,
            tags JSONB NOT NULL DEFAULT '{}'::jsonb
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS ec2_instances (
            id BIGSERIAL PRIMARY KEY,
            instance_id VARCHAR(64) NOT NULL,
            account_id VARCHAR(32) NOT NULL,
            subnet_id VARCHAR(64) NOT NULL,
            tags JSONB NOT NULL DEFAULT '{}'::jsonb,
            UNIQUE (instance_id, account_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS colors (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(64) NOT NULL UNIQUE,
            in_use BOOLEAN NOT NULL DEFAULT FALSE,
            last_in_use TIMESTAMPTZ NOT NULL DEFAULT 'epoch'
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_subnets_account_id ON subnets(account_id)",
        "CREATE INDEX IF NOT EXISTS idx_ec2_instances_subnet_id ON ec2_instances(subnet_id)",
        "CREATE INDEX IF NOT EXISTS idx_ec2_instances_tags ON ec2_instances USING GIN (tags)",
        "CREATE INDEX IF NOT EXISTS idx_colors_in_use ON colors(in_use)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }

    debug!("Successfully completed PostgreSQL database migrations");
    Ok(())
}
