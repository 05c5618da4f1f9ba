pub mod sqlite_color_repository;
pub mod sqlite_instance_repository;
pub mod sqlite_segment_repository;

pub use sqlite_color_repository::SqliteColorRepository;
pub use sqlite_instance_repository::SqliteInstanceRepository;
pub use sqlite_segment_repository::SqliteSegmentRepository;

use inventory_core::InventoryResult;
use sqlx::SqlitePool;
use tracing::debug;

/// 运行SQLite数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> InventoryResult<()> {
    debug!("Running SQLite database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subnets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subnet_id TEXT NOT NULL UNIQUE,
            vpc_id TEXT NOT NULL,
            availability_zone TEXT NOT NULL,
            account_id TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ec2_instances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id TEXT NOT NULL,
            account_id TEXT NOT NULL,
            subnet_id TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '{}',
            UNIQUE (instance_id, account_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS colors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            in_use BOOLEAN NOT NULL DEFAULT 0,
            last_in_use DATETIME NOT NULL DEFAULT '1970-01-01T00:00:00+00:00'
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_subnets_account_id ON subnets(account_id)",
        "CREATE INDEX IF NOT EXISTS idx_ec2_instances_subnet_id ON ec2_instances(subnet_id)",
        "CREATE INDEX IF NOT EXISTS idx_colors_in_use ON colors(in_use)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("Successfully completed SQLite database migrations");
    Ok(())
}
