use anyhow::Context;
use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::analysis::prediction::Tip;
use crate::db::PgStore;
use crate::nutrition::UserProfile;

/// Persistence for health profiles and the tips shown alongside them.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>>;
    async fn put_profile(&self, user_id: Uuid, profile: &UserProfile) -> anyhow::Result<()>;
    /// Empty when nothing has been stored yet.
    async fn get_tips(&self, user_id: Uuid) -> anyhow::Result<Vec<Tip>>;
    /// Replaces the stored tips wholesale.
    async fn update_tips(&self, user_id: Uuid, tips: &[Tip]) -> anyhow::Result<()>;
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let row: Option<(Option<Json<UserProfile>>,)> =
            sqlx::query_as("SELECT profile FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.and_then(|(profile,)| profile).map(|Json(p)| p))
    }

    async fn put_profile(&self, user_id: Uuid, profile: &UserProfile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, profile, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET profile = EXCLUDED.profile, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(profile))
        .execute(&self.db)
        .await
        .context("upsert profile")?;
        Ok(())
    }

    async fn get_tips(&self, user_id: Uuid) -> anyhow::Result<Vec<Tip>> {
        let row: Option<(Json<Vec<Tip>>,)> =
            sqlx::query_as("SELECT tips FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(|(Json(tips),)| tips).unwrap_or_default())
    }

    async fn update_tips(&self, user_id: Uuid, tips: &[Tip]) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, tips, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id)
            DO UPDATE SET tips = EXCLUDED.tips, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(tips))
        .execute(&self.db)
        .await
        .context("update tips")?;
        Ok(())
    }
}
