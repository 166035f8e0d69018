use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::gallery::models::{GalleryCategory, GalleryImage, ImageFields};
use crate::features::gallery::repositories::GalleryRepository;
use crate::features::gallery::seed::default_gallery;
use crate::shared::validation::{slugify, SLUG_REGEX};

/// Images grouped by category slug
pub type GalleryData = BTreeMap<String, Vec<GalleryImage>>;

pub struct GalleryService {
    repository: Arc<dyn GalleryRepository>,
}

impl GalleryService {
    pub fn new(repository: Arc<dyn GalleryRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_all_categories(&self) -> Result<Vec<GalleryCategory>> {
        self.repository.list_categories().await
    }

    /// Every category by slug, including those without images
    pub async fn get_gallery_data(&self) -> Result<GalleryData> {
        let categories = self.repository.list_categories().await?;
        let images = self.repository.list_images(None).await?;

        let slugs: BTreeMap<Uuid, String> = categories
            .iter()
            .map(|c| (c.id, c.slug.clone()))
            .collect();
        let mut data: GalleryData = categories
            .into_iter()
            .map(|c| (c.slug, Vec::new()))
            .collect();

        for image in images {
            if let Some(bucket) = slugs.get(&image.category_id).and_then(|s| data.get_mut(s)) {
                bucket.push(image);
            }
        }

        Ok(data)
    }

    /// Images, optionally restricted to one category slug
    pub async fn list_images(&self, category_slug: Option<&str>) -> Result<Vec<GalleryImage>> {
        let category_id = match category_slug {
            Some(slug) => Some(
                self.repository
                    .find_category_by_slug(slug)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Category not found: {}", slug)))?
                    .id,
            ),
            None => None,
        };

        self.repository.list_images(category_id).await
    }

    /// Create a category. Fails with `Conflict` when its slug is already taken.
    pub async fn add_category(&self, name: &str) -> Result<GalleryCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }

        let slug = slugify(name);
        if !SLUG_REGEX.is_match(&slug) {
            return Err(AppError::Validation(format!(
                "Category name '{}' does not produce a valid slug",
                name
            )));
        }

        if self.repository.find_category_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A category with slug '{}' already exists",
                slug
            )));
        }

        let category = self.repository.insert_category(name, &slug).await?;
        info!("Gallery category created: {} ({})", category.name, category.slug);
        Ok(category)
    }

    /// Delete a category and its images. `Ok(false)` when it does not exist.
    pub async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let deleted = self.repository.delete_category(id).await?;
        if deleted {
            info!("Gallery category deleted: {}", id);
        }
        Ok(deleted)
    }

    pub async fn delete_all_categories(&self) -> Result<u64> {
        let deleted = self.repository.delete_all_categories().await?;
        info!("Deleted all gallery categories: {}", deleted);
        Ok(deleted)
    }

    pub async fn add_image(&self, category_id: Uuid, fields: ImageFields) -> Result<GalleryImage> {
        let fields = self.checked_fields(category_id, fields).await?;
        let image = self.repository.insert_image(category_id, &fields).await?;
        info!("Gallery image added: {} in {}", image.id, category_id);
        Ok(image)
    }

    /// Replace an image. `Ok(false)` when it does not exist.
    pub async fn update_image(
        &self,
        id: Uuid,
        category_id: Uuid,
        fields: ImageFields,
    ) -> Result<bool> {
        if self.repository.find_image(id).await?.is_none() {
            return Ok(false);
        }

        let fields = self.checked_fields(category_id, fields).await?;
        let updated = self.repository.update_image(id, category_id, &fields).await?;
        if updated {
            info!("Gallery image updated: {}", id);
        }
        Ok(updated)
    }

    pub async fn delete_image(&self, id: Uuid) -> Result<bool> {
        self.repository.delete_image(id).await
    }

    /// Replace the gallery with the built-in categories and images
    pub async fn reset_gallery_data(&self) -> Result<()> {
        let seed = default_gallery();
        self.repository.replace_all(&seed).await?;
        info!("Gallery reset: {} categories", seed.len());
        Ok(())
    }

    async fn checked_fields(&self, category_id: Uuid, mut fields: ImageFields) -> Result<ImageFields> {
        fields.title = fields.title.trim().to_string();
        fields.src = fields.src.trim().to_string();

        if fields.title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if fields.src.is_empty() {
            return Err(AppError::Validation("Image source is required".to_string()));
        }
        if self.repository.find_category(category_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Category does not exist: {}",
                category_id
            )));
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::gallery::repositories::MemoryGalleryRepository;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn service() -> GalleryService {
        GalleryService::new(Arc::new(MemoryGalleryRepository::new()))
    }

    fn fields(title: &str, src: &str) -> ImageFields {
        ImageFields {
            src: src.to_string(),
            title: title.to_string(),
            description: Some(Sentence(3..8).fake()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_category_derives_slug() {
        let service = service();

        let category = service.add_category("Equipos de Rescate").await.unwrap();

        assert_eq!(category.name, "Equipos de Rescate");
        assert_eq!(category.slug, "equipos_de_rescate");
    }

    #[tokio::test]
    async fn test_duplicate_category_is_conflict() {
        let service = service();
        service.add_category("Equipos de Rescate").await.unwrap();

        let err = service.add_category("equipos  de rescate").await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(service.get_all_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_category_rejects_blank_and_bad_names() {
        let service = service();

        assert!(matches!(
            service.add_category("   ").await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            service.add_category("_interno").await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_image_requires_title_src_and_category() {
        let service = service();
        let category = service.add_category("Aulas").await.unwrap();

        let missing_title = service.add_image(category.id, fields(" ", "/a.jpg")).await;
        let missing_src = service.add_image(category.id, fields("Aula", "")).await;
        let missing_category = service.add_image(Uuid::now_v7(), fields("Aula", "/a.jpg")).await;

        assert!(matches!(missing_title, Err(AppError::Validation(_))));
        assert!(matches!(missing_src, Err(AppError::Validation(_))));
        assert!(matches!(missing_category, Err(AppError::Validation(_))));
        assert!(service.list_images(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_image() {
        let service = service();
        let aulas = service.add_category("Aulas").await.unwrap();
        let torre = service.add_category("Torre").await.unwrap();
        let image = service
            .add_image(aulas.id, fields("Aula 1", "/upload/gallery/images/a.jpg"))
            .await
            .unwrap();

        let moved = service
            .update_image(image.id, torre.id, fields("Torre 1", "/upload/gallery/images/b.jpg"))
            .await
            .unwrap();
        assert!(moved);
        let in_torre = service.list_images(Some("torre")).await.unwrap();
        assert_eq!(in_torre[0].title, "Torre 1");
        assert!(service.list_images(Some("aulas")).await.unwrap().is_empty());

        assert!(!service
            .update_image(Uuid::now_v7(), torre.id, fields("x", "/x.jpg"))
            .await
            .unwrap());
        assert!(service.delete_image(image.id).await.unwrap());
        assert!(!service.delete_image(image.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_category_leaves_no_orphans() {
        let service = service();
        let category = service.add_category("Capacitaciones").await.unwrap();
        service
            .add_image(category.id, fields("Curso", "/upload/gallery/images/c.jpg"))
            .await
            .unwrap();

        assert!(service.delete_category(category.id).await.unwrap());

        assert!(service.list_images(None).await.unwrap().is_empty());
        assert!(!service.get_gallery_data().await.unwrap().contains_key("capacitaciones"));
        assert!(matches!(
            service.list_images(Some("capacitaciones")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(!service.delete_category(category.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_gallery_data_includes_empty_categories() {
        let service = service();
        let full = service.add_category("Aulas").await.unwrap();
        service.add_category("Vacía").await.unwrap();
        service
            .add_image(full.id, fields("Aula", "/upload/gallery/images/a.jpg"))
            .await
            .unwrap();

        let data = service.get_gallery_data().await.unwrap();

        assert_eq!(data["aulas"].len(), 1);
        assert!(data["vacía"].is_empty());
    }

    #[tokio::test]
    async fn test_reset_restores_seed_set() {
        let service = service();
        service.add_category("Temporal").await.unwrap();

        service.reset_gallery_data().await.unwrap();
        service.reset_gallery_data().await.unwrap();

        let data = service.get_gallery_data().await.unwrap();
        let slugs: Vec<&String> = data.keys().collect();
        assert_eq!(slugs, vec!["capacitaciones", "equipos_de_rescate", "instalaciones"]);
        assert!(data.values().all(|images| !images.is_empty()));
    }
}
