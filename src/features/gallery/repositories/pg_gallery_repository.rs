use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::gallery::models::{
    CategorySeed, GalleryCategory, GalleryImage, GalleryImageRow, ImageFields,
};
use crate::features::gallery::repositories::GalleryRepository;

const IMAGE_COLUMNS: &str =
    "id, category_id, src, alt, title, description, tags, media_type, thumbnail_src";

/// Convert database error to more specific AppError with user-friendly messages
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // Unique constraint violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            return AppError::Conflict("A category with this name already exists.".to_string());
        }

        // Foreign key violation
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::BadRequest("Referenced category does not exist.".to_string());
        }
    }

    AppError::Database(e)
}

pub struct PgGalleryRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PgGalleryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgGalleryRepository")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_category_tx(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        slug: &str,
    ) -> Result<GalleryCategory> {
        sqlx::query_as::<_, GalleryCategory>(
            r#"
            INSERT INTO gallery_categories (id, name, slug)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(slug)
        .fetch_one(&mut **tx)
        .await
        .map_err(handle_db_error)
    }

    async fn insert_image_tx(
        tx: &mut Transaction<'_, Postgres>,
        category_id: Uuid,
        fields: &ImageFields,
    ) -> Result<GalleryImage> {
        let row = sqlx::query_as::<_, GalleryImageRow>(&format!(
            r#"
            INSERT INTO gallery_images
                (id, category_id, src, alt, title, description, tags, media_type, thumbnail_src)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            IMAGE_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(&fields.src)
        .bind(&fields.alt)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.tags)
        .bind(fields.media_type.as_str())
        .bind(&fields.thumbnail_src)
        .fetch_one(&mut **tx)
        .await
        .map_err(handle_db_error)?;

        Ok(row.into())
    }
}

#[async_trait]
impl GalleryRepository for PgGalleryRepository {
    async fn list_categories(&self) -> Result<Vec<GalleryCategory>> {
        sqlx::query_as::<_, GalleryCategory>(
            r#"
            SELECT id, name, slug
            FROM gallery_categories
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<GalleryCategory>> {
        sqlx::query_as::<_, GalleryCategory>(
            "SELECT id, name, slug FROM gallery_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<GalleryCategory>> {
        sqlx::query_as::<_, GalleryCategory>(
            "SELECT id, name, slug FROM gallery_categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn insert_category(&self, name: &str, slug: &str) -> Result<GalleryCategory> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let category = Self::insert_category_tx(&mut tx, name, slug).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        // Images go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM gallery_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_categories(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM gallery_categories")
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn list_images(&self, category_id: Option<Uuid>) -> Result<Vec<GalleryImage>> {
        let rows = sqlx::query_as::<_, GalleryImageRow>(&format!(
            r#"
            SELECT {}
            FROM gallery_images
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
            IMAGE_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(GalleryImage::from).collect())
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<GalleryImage>> {
        let row = sqlx::query_as::<_, GalleryImageRow>(&format!(
            "SELECT {} FROM gallery_images WHERE id = $1",
            IMAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.map(GalleryImage::from))
    }

    async fn insert_image(&self, category_id: Uuid, fields: &ImageFields) -> Result<GalleryImage> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let image = Self::insert_image_tx(&mut tx, category_id, fields).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(image)
    }

    async fn update_image(
        &self,
        id: Uuid,
        category_id: Uuid,
        fields: &ImageFields,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE gallery_images
            SET category_id = $2, src = $3, alt = $4, title = $5, description = $6,
                tags = $7, media_type = $8, thumbnail_src = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(category_id)
        .bind(&fields.src)
        .bind(&fields.alt)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.tags)
        .bind(fields.media_type.as_str())
        .bind(&fields.thumbnail_src)
        .execute(&self.pool)
        .await
        .map_err(handle_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_all(&self, seed: &[CategorySeed]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM gallery_categories")
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for entry in seed {
            let category = Self::insert_category_tx(&mut tx, &entry.name, &entry.slug).await?;
            for fields in &entry.images {
                Self::insert_image_tx(&mut tx, category.id, fields).await?;
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
