use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Stored hero document. Every save is a new row; the newest wins.
#[derive(Debug, FromRow)]
struct HeroContentRow {
    data: Value,
}

#[async_trait]
pub trait HeroRepository: Send + Sync {
    /// Most recently saved hero document
    async fn latest(&self) -> Result<Option<Value>>;

    async fn save(&self, data: &Value) -> Result<()>;
}

pub struct PgHeroRepository {
    pool: PgPool,
}

impl PgHeroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HeroRepository for PgHeroRepository {
    async fn latest(&self) -> Result<Option<Value>> {
        let row = sqlx::query_as::<_, HeroContentRow>(
            r#"
            SELECT data
            FROM hero_content
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(|r| r.data))
    }

    async fn save(&self, data: &Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO hero_content (id, data, updated_at)
            VALUES ($1, $2, NOW())
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryHeroRepository {
    data: tokio::sync::RwLock<Option<Value>>,
}

#[cfg(test)]
impl MemoryHeroRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl HeroRepository for MemoryHeroRepository {
    async fn latest(&self) -> Result<Option<Value>> {
        Ok(self.data.read().await.clone())
    }

    async fn save(&self, data: &Value) -> Result<()> {
        *self.data.write().await = Some(data.clone());
        Ok(())
    }
}
