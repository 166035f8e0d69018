use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::content::models::{normalize_hero, SectionKind};
use crate::features::content::repositories::HeroRepository;

/// Hero content endpoint backed by the `hero_content` table
pub struct HeroService {
    repository: Arc<dyn HeroRepository>,
}

impl HeroService {
    pub fn new(repository: Arc<dyn HeroRepository>) -> Self {
        Self { repository }
    }

    /// Stored hero document, or the default when nothing was saved yet
    pub async fn get(&self) -> Result<Value> {
        Ok(self
            .repository
            .latest()
            .await?
            .unwrap_or_else(|| SectionKind::Hero.default_document()))
    }

    pub async fn save(&self, data: Value) -> Result<Value> {
        if !data.is_object() {
            return Err(AppError::Validation(
                "Hero content must be a JSON object".to_string(),
            ));
        }

        let data = normalize_hero(data);
        self.repository.save(&data).await?;
        info!("Hero content saved");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::content::repositories::MemoryHeroRepository;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_returns_default_when_empty() {
        let service = HeroService::new(Arc::new(MemoryHeroRepository::new()));
        assert_eq!(
            service.get().await.unwrap(),
            SectionKind::Hero.default_document()
        );
    }

    #[tokio::test]
    async fn test_save_normalizes_and_persists() {
        let service = HeroService::new(Arc::new(MemoryHeroRepository::new()));

        let saved = service
            .save(json!({ "texts": ["Título"], "title": "viejo" }))
            .await
            .unwrap();

        assert_eq!(saved["title"], "Título");
        assert_eq!(saved["subtitle"], "");
        assert_eq!(service.get().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_save_rejects_non_object() {
        let service = HeroService::new(Arc::new(MemoryHeroRepository::new()));
        let err = service.save(json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
