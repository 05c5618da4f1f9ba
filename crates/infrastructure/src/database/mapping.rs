//! Shared row mapping helpers
//!
//! Tags are JSONB in PostgreSQL and JSON text in SQLite.

use inventory_core::{InventoryError, InventoryResult};
use inventory_domain::{ColorToken, ComputeInstance, NetworkSegment, Tags};
use sqlx::{types::Json, Row};

pub struct MappingHelpers;

impl MappingHelpers {
    pub fn parse_tags_postgres(
        row: &sqlx::postgres::PgRow,
        field_name: &str,
    ) -> InventoryResult<Tags> {
        let tags = row
            .try_get::<Option<Json<Tags>>, _>(field_name)
            .map_err(|e| InventoryError::Serialization(format!("解析标签失败: {e}")))?;
        Ok(tags.map(|t| t.0).unwrap_or_default())
    }

    pub fn parse_tags_sqlite(
        row: &sqlx::sqlite::SqliteRow,
        field_name: &str,
    ) -> InventoryResult<Tags> {
        match row.try_get::<Option<String>, _>(field_name)? {
            Some(text) if !text.is_empty() => serde_json::from_str(&text)
                .map_err(|e| InventoryError::Serialization(format!("解析标签失败: {e}"))),
            _ => Ok(Tags::new()),
        }
    }

    pub fn segment_from_pg(row: &sqlx::postgres::PgRow) -> InventoryResult<NetworkSegment> {
        Ok(NetworkSegment {
            subnet_id: row.try_get("subnet_id")?,
            vpc_id: row.try_get("vpc_id")?,
            availability_zone: row.try_get("availability_zone")?,
            account_id: row.try_get("account_id")?,
            tags: Self::parse_tags_postgres(row, "tags")?,
        })
    }

    pub fn segment_from_sqlite(row: &sqlx::sqlite::SqliteRow) -> InventoryResult<NetworkSegment> {
        Ok(NetworkSegment {
            subnet_id: row.try_get("subnet_id")?,
            vpc_id: row.try_get("vpc_id")?,
            availability_zone: row.try_get("availability_zone")?,
            account_id: row.try_get("account_id")?,
            tags: Self::parse_tags_sqlite(row, "tags")?,
        })
    }

    pub fn instance_from_pg(row: &sqlx::postgres::PgRow) -> InventoryResult<ComputeInstance> {
        Ok(ComputeInstance {
            instance_id: row.try_get("instance_id")?,
            account_id: row.try_get("account_id")?,
            subnet_id: row.try_get("subnet_id")?,
            tags: Self::parse_tags_postgres(row, "tags")?,
        })
    }

    pub fn instance_from_sqlite(row: &sqlx::sqlite::SqliteRow) -> InventoryResult<ComputeInstance> {
        Ok(ComputeInstance {
            instance_id: row.try_get("instance_id")?,
            account_id: row.try_get("account_id")?,
            subnet_id: row.try_get("subnet_id")?,
            tags: Self::parse_tags_sqlite(row, "tags")?,
        })
    }

    pub fn color_from_pg(row: &sqlx::postgres::PgRow) -> InventoryResult<ColorToken> {
        Ok(ColorToken {
            name: row.try_get("name")?,
            in_use: row.try_get("in_use")?,
            last_used: row.try_get("last_in_use")?,
        })
    }

    pub fn color_from_sqlite(row: &sqlx::sqlite::SqliteRow) -> InventoryResult<ColorToken> {
        Ok(ColorToken {
            name: row.try_get("name")?,
            in_use: row.try_get("in_use")?,
            last_used: row.try_get("last_in_use")?,
        })
    }

    /// SQLite 中以JSON文本保存标签
    pub fn tags_to_text(tags: &Tags) -> InventoryResult<String> {
        Ok(serde_json::to_string(tags)?)
    }
}
