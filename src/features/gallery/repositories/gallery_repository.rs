use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::gallery::models::{CategorySeed, GalleryCategory, GalleryImage, ImageFields};

/// Storage for categories and their images.
///
/// Deleting a category deletes its images.
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<GalleryCategory>>;

    async fn find_category(&self, id: Uuid) -> Result<Option<GalleryCategory>>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<GalleryCategory>>;

    /// Fails with `AppError::Conflict` when the slug is taken
    async fn insert_category(&self, name: &str, slug: &str) -> Result<GalleryCategory>;

    async fn delete_category(&self, id: Uuid) -> Result<bool>;

    /// Returns the number of categories removed
    async fn delete_all_categories(&self) -> Result<u64>;

    async fn list_images(&self, category_id: Option<Uuid>) -> Result<Vec<GalleryImage>>;

    async fn find_image(&self, id: Uuid) -> Result<Option<GalleryImage>>;

    async fn insert_image(&self, category_id: Uuid, fields: &ImageFields) -> Result<GalleryImage>;

    async fn update_image(&self, id: Uuid, category_id: Uuid, fields: &ImageFields)
        -> Result<bool>;

    async fn delete_image(&self, id: Uuid) -> Result<bool>;

    /// Replace the whole gallery in one step; on failure nothing changes
    async fn replace_all(&self, seed: &[CategorySeed]) -> Result<()>;
}
