use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::gallery::models::{CategorySeed, GalleryCategory, GalleryImage, ImageFields};
use crate::features::gallery::repositories::GalleryRepository;

#[derive(Debug, Default)]
struct GalleryState {
    categories: Vec<GalleryCategory>,
    images: Vec<GalleryImage>,
}

/// Process-local gallery backing the service and handler tests
#[derive(Debug, Default)]
pub struct MemoryGalleryRepository {
    state: RwLock<GalleryState>,
}

impl MemoryGalleryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GalleryRepository for MemoryGalleryRepository {
    async fn list_categories(&self) -> Result<Vec<GalleryCategory>> {
        Ok(self.state.read().await.categories.clone())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<GalleryCategory>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<GalleryCategory>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn insert_category(&self, name: &str, slug: &str) -> Result<GalleryCategory> {
        let mut state = self.state.write().await;
        if state.categories.iter().any(|c| c.slug == slug) {
            return Err(AppError::Conflict(
                "A category with this name already exists.".to_string(),
            ));
        }

        let category = GalleryCategory {
            id: Uuid::now_v7(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Ok(false);
        }

        state.images.retain(|i| i.category_id != id);
        Ok(true)
    }

    async fn delete_all_categories(&self) -> Result<u64> {
        let mut state = self.state.write().await;
        let removed = state.categories.len() as u64;
        state.categories.clear();
        state.images.clear();
        Ok(removed)
    }

    async fn list_images(&self, category_id: Option<Uuid>) -> Result<Vec<GalleryImage>> {
        let state = self.state.read().await;
        Ok(state
            .images
            .iter()
            .filter(|i| category_id.map_or(true, |id| i.category_id == id))
            .cloned()
            .collect())
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<GalleryImage>> {
        let state = self.state.read().await;
        Ok(state.images.iter().find(|i| i.id == id).cloned())
    }

    async fn insert_image(&self, category_id: Uuid, fields: &ImageFields) -> Result<GalleryImage> {
        let mut state = self.state.write().await;
        if !state.categories.iter().any(|c| c.id == category_id) {
            return Err(AppError::BadRequest(
                "Referenced category does not exist.".to_string(),
            ));
        }

        let image = fields.clone().into_image(Uuid::now_v7(), category_id);
        state.images.push(image.clone());
        Ok(image)
    }

    async fn update_image(
        &self,
        id: Uuid,
        category_id: Uuid,
        fields: &ImageFields,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.categories.iter().any(|c| c.id == category_id) {
            return Err(AppError::BadRequest(
                "Referenced category does not exist.".to_string(),
            ));
        }

        match state.images.iter_mut().find(|i| i.id == id) {
            Some(image) => {
                *image = fields.clone().into_image(id, category_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.images.len();
        state.images.retain(|i| i.id != id);
        Ok(state.images.len() < before)
    }

    async fn replace_all(&self, seed: &[CategorySeed]) -> Result<()> {
        let mut next = GalleryState::default();
        for entry in seed {
            if next.categories.iter().any(|c| c.slug == entry.slug) {
                return Err(AppError::Conflict(format!(
                    "Duplicate category slug in seed: {}",
                    entry.slug
                )));
            }

            let category = GalleryCategory {
                id: Uuid::now_v7(),
                name: entry.name.clone(),
                slug: entry.slug.clone(),
            };
            next.images.extend(
                entry
                    .images
                    .iter()
                    .map(|fields| fields.clone().into_image(Uuid::now_v7(), category.id)),
            );
            next.categories.push(category);
        }

        *self.state.write().await = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::gallery::models::MediaType;

    fn fields(title: &str) -> ImageFields {
        ImageFields {
            src: format!("/upload/gallery/images/{}.jpg", title),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_delete_category_cascades_images() {
        let repo = MemoryGalleryRepository::new();
        let keep = repo.insert_category("Aulas", "aulas").await.unwrap();
        let removed = repo.insert_category("Torre", "torre").await.unwrap();
        repo.insert_image(keep.id, &fields("a")).await.unwrap();
        repo.insert_image(removed.id, &fields("b")).await.unwrap();

        assert!(repo.delete_category(removed.id).await.unwrap());
        assert!(!repo.delete_category(removed.id).await.unwrap());

        let images = repo.list_images(None).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].category_id, keep.id);
        assert!(repo.list_images(Some(removed.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_image_requires_category() {
        let repo = MemoryGalleryRepository::new();
        let err = repo.insert_image(Uuid::now_v7(), &fields("x")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_replace_all_is_all_or_nothing() {
        let repo = MemoryGalleryRepository::new();
        let existing = repo.insert_category("Aulas", "aulas").await.unwrap();

        let broken = vec![
            CategorySeed {
                name: "Uno".to_string(),
                slug: "uno".to_string(),
                images: vec![],
            },
            CategorySeed {
                name: "uno".to_string(),
                slug: "uno".to_string(),
                images: vec![],
            },
        ];
        assert!(repo.replace_all(&broken).await.is_err());
        assert_eq!(repo.list_categories().await.unwrap(), vec![existing]);

        let seed = vec![CategorySeed {
            name: "Videos".to_string(),
            slug: "videos".to_string(),
            images: vec![ImageFields {
                media_type: MediaType::Video,
                ..fields("clip")
            }],
        }];
        repo.replace_all(&seed).await.unwrap();

        let categories = repo.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        let images = repo.list_images(Some(categories[0].id)).await.unwrap();
        assert_eq!(images[0].media_type, MediaType::Video);
    }
}
