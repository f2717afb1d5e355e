use anyhow::Context;
use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::repo_types::{NewScan, ScanRecord, ScanRow};
use crate::db::PgStore;
use crate::nutrition::Condition;

/// Persistence for scan history. Every lookup is scoped to the owning user.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn insert_scan(&self, user_id: Uuid, scan: NewScan) -> anyhow::Result<ScanRecord>;
    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>>;
    async fn list_by_condition(
        &self,
        user_id: Uuid,
        condition: Condition,
    ) -> anyhow::Result<Vec<ScanRecord>>;
    async fn get_scan(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<Option<ScanRecord>>;
    /// Returns whether a record was removed.
    async fn delete_scan(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<bool>;
    async fn set_image_key(&self, user_id: Uuid, scan_id: Uuid, key: &str) -> anyhow::Result<()>;
}

fn into_records(rows: Vec<ScanRow>) -> anyhow::Result<Vec<ScanRecord>> {
    rows.into_iter().map(ScanRecord::try_from).collect()
}

#[async_trait]
impl ScanStore for PgStore {
    async fn insert_scan(&self, user_id: Uuid, scan: NewScan) -> anyhow::Result<ScanRecord> {
        let row = sqlx::query_as::<_, ScanRow>(
            r#"
            INSERT INTO scan_records (id, user_id, food_name, nutrition, condition, prediction)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, food_name, nutrition, condition, prediction, image_key, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(scan.food_name)
        .bind(Json(scan.nutrition))
        .bind(scan.condition.as_str())
        .bind(Json(scan.prediction))
        .fetch_one(&self.db)
        .await
        .context("insert scan record")?;
        row.try_into()
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRow>(
            r#"
            SELECT id, user_id, food_name, nutrition, condition, prediction, image_key, created_at
            FROM scan_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        into_records(rows)
    }

    async fn list_by_condition(
        &self,
        user_id: Uuid,
        condition: Condition,
    ) -> anyhow::Result<Vec<ScanRecord>> {
        let rows = sqlx::query_as::<_, ScanRow>(
            r#"
            SELECT id, user_id, food_name, nutrition, condition, prediction, image_key, created_at
            FROM scan_records
            WHERE user_id = $1 AND condition = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(condition.as_str())
        .fetch_all(&self.db)
        .await?;
        into_records(rows)
    }

    async fn get_scan(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<Option<ScanRecord>> {
        let row = sqlx::query_as::<_, ScanRow>(
            r#"
            SELECT id, user_id, food_name, nutrition, condition, prediction, image_key, created_at
            FROM scan_records
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(scan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(ScanRecord::try_from).transpose()
    }

    async fn delete_scan(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM scan_records WHERE id = $1 AND user_id = $2")
            .bind(scan_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn set_image_key(&self, user_id: Uuid, scan_id: Uuid, key: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE scan_records SET image_key = $3 WHERE id = $1 AND user_id = $2")
            .bind(scan_id)
            .bind(user_id)
            .bind(key)
            .execute(&self.db)
            .await
            .context("set scan image key")?;
        Ok(())
    }
}
