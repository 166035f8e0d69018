use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::content::dtos::HeroContentDto;
use crate::features::content::services::HeroService;
use crate::shared::types::ApiResponse;

/// Get the stored hero content
#[utoipa::path(
    get,
    path = "/api/hero",
    tag = "content",
    responses(
        (status = 200, description = "Hero document, default when nothing is stored")
    )
)]
pub async fn get_hero(
    State(service): State<Arc<HeroService>>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let data = service.get().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Save hero content
#[utoipa::path(
    post,
    path = "/api/hero",
    tag = "content",
    request_body = HeroContentDto,
    responses(
        (status = 200, description = "Hero content saved"),
        (status = 400, description = "Invalid hero document"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn save_hero(
    State(service): State<Arc<HeroService>>,
    AppJson(dto): AppJson<HeroContentDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let data = service.save(dto.data).await?;
    Ok(Json(ApiResponse::success(
        Some(data),
        Some("Hero content saved".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::content::repositories::MemoryHeroRepository;
    use crate::features::content::routes::{hero_admin_routes, hero_routes};
    use crate::features::content::clients::{HeroRemote, RepositoryHeroRemote};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_hero_endpoint_round_trip() {
        let repository = Arc::new(MemoryHeroRepository::new());
        let service = Arc::new(HeroService::new(repository.clone()));
        let server =
            TestServer::new(hero_routes(service.clone()).merge(hero_admin_routes(service)))
                .unwrap();

        let body: Value = server.get("/api/hero").await.json();
        assert_eq!(body["success"], true);
        assert!(body["data"]["texts"].is_array());

        server
            .post("/api/hero")
            .json(&json!({ "data": { "texts": ["Nuevo título"] } }))
            .await
            .assert_status_ok();

        let body: Value = server.get("/api/hero").await.json();
        assert_eq!(body["data"]["title"], "Nuevo título");

        // The content store sees the same document through the repository remote
        let remote = RepositoryHeroRemote::new(repository);
        assert_eq!(remote.fetch().await.unwrap()["title"], "Nuevo título");
    }

    #[tokio::test]
    async fn test_hero_post_requires_data() {
        let service = Arc::new(HeroService::new(Arc::new(MemoryHeroRepository::new())));
        let server = TestServer::new(hero_admin_routes(service)).unwrap();

        server
            .post("/api/hero")
            .json(&json!({ "title": "sin envoltura" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
