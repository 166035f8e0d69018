use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::gallery::dtos::{
    CreateCategoryDto, DeleteCategoriesQuery, DeletedCountDto, ImageDto, ListImagesQuery,
};
use crate::features::gallery::models::{GalleryCategory, GalleryImage};
use crate::features::gallery::services::{GalleryData, GalleryService};
use crate::shared::types::{ApiResponse, Meta};

/// Get all images grouped by category slug
#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "gallery",
    responses(
        (status = 200, description = "Map of category slug to its images; empty categories included")
    )
)]
pub async fn get_gallery(
    State(service): State<Arc<GalleryService>>,
) -> Result<Json<ApiResponse<GalleryData>>> {
    let data = service.get_gallery_data().await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// List gallery categories
#[utoipa::path(
    get,
    path = "/api/gallery/categories",
    tag = "gallery",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<GalleryCategory>>)
    )
)]
pub async fn list_categories(
    State(service): State<Arc<GalleryService>>,
) -> Result<Json<ApiResponse<Vec<GalleryCategory>>>> {
    let categories = service.get_all_categories().await?;
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Create a gallery category
#[utoipa::path(
    post,
    path = "/api/gallery/categories",
    tag = "gallery",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<GalleryCategory>),
        (status = 400, description = "Invalid name"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "Slug already exists")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn create_category(
    State(service): State<Arc<GalleryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<GalleryCategory>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.add_category(&dto.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

/// Delete every category and image
#[utoipa::path(
    delete,
    path = "/api/gallery/categories",
    tag = "gallery",
    params(DeleteCategoriesQuery),
    responses(
        (status = 200, description = "All categories deleted", body = ApiResponse<DeletedCountDto>),
        (status = 400, description = "`all=true` missing"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_all_categories(
    State(service): State<Arc<GalleryService>>,
    Query(query): Query<DeleteCategoriesQuery>,
) -> Result<Json<ApiResponse<DeletedCountDto>>> {
    if !query.all {
        return Err(AppError::BadRequest(
            "Pass all=true to delete every category".to_string(),
        ));
    }

    let deleted = service.delete_all_categories().await?;

    Ok(Json(ApiResponse::success(
        Some(DeletedCountDto { deleted }),
        Some("All categories deleted".to_string()),
        None,
    )))
}

/// Delete a category and its images
#[utoipa::path(
    delete,
    path = "/api/gallery/categories/{id}",
    tag = "gallery",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Category not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_category(
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    if !service.delete_category(id).await? {
        return Err(AppError::NotFound(format!("Category {} not found", id)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted successfully".to_string()),
        None,
    )))
}

/// List gallery images
#[utoipa::path(
    get,
    path = "/api/gallery/images",
    tag = "gallery",
    params(ListImagesQuery),
    responses(
        (status = 200, description = "List of images", body = ApiResponse<Vec<GalleryImage>>),
        (status = 404, description = "Category not found")
    )
)]
pub async fn list_images(
    State(service): State<Arc<GalleryService>>,
    Query(query): Query<ListImagesQuery>,
) -> Result<Json<ApiResponse<Vec<GalleryImage>>>> {
    let images = service.list_images(query.category.as_deref()).await?;
    let total = images.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(images),
        None,
        Some(Meta { total }),
    )))
}

/// Add an image to a category
#[utoipa::path(
    post,
    path = "/api/gallery/images",
    tag = "gallery",
    request_body = ImageDto,
    responses(
        (status = 201, description = "Image created", body = ApiResponse<GalleryImage>),
        (status = 400, description = "Missing title or src, or unknown category"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn create_image(
    State(service): State<Arc<GalleryService>>,
    AppJson(dto): AppJson<ImageDto>,
) -> Result<(StatusCode, Json<ApiResponse<GalleryImage>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (category_id, fields) = dto.into_parts();
    let image = service.add_image(category_id, fields).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(image),
            Some("Image created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace an image
#[utoipa::path(
    put,
    path = "/api/gallery/images/{id}",
    tag = "gallery",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    request_body = ImageDto,
    responses(
        (status = 200, description = "Image updated"),
        (status = 400, description = "Missing title or src, or unknown category"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Image not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn update_image(
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ImageDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (category_id, fields) = dto.into_parts();
    if !service.update_image(id, category_id, fields).await? {
        return Err(AppError::NotFound(format!("Image {} not found", id)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Image updated successfully".to_string()),
        None,
    )))
}

/// Delete an image
#[utoipa::path(
    delete,
    path = "/api/gallery/images/{id}",
    tag = "gallery",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Image not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_image(
    State(service): State<Arc<GalleryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    if !service.delete_image(id).await? {
        return Err(AppError::NotFound(format!("Image {} not found", id)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Image deleted successfully".to_string()),
        None,
    )))
}

/// Restore the built-in gallery
#[utoipa::path(
    post,
    path = "/api/gallery/reset",
    tag = "gallery",
    responses(
        (status = 200, description = "Gallery reset"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn reset_gallery(
    State(service): State<Arc<GalleryService>>,
) -> Result<Json<ApiResponse<()>>> {
    service.reset_gallery_data().await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Gallery reset successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::gallery::repositories::MemoryGalleryRepository;
    use crate::features::gallery::routes::{admin_routes, routes};
    use axum::Router;
    use axum_test::TestServer;
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use serde_json::{json, Value};

    fn server() -> TestServer {
        let service = Arc::new(GalleryService::new(Arc::new(MemoryGalleryRepository::new())));
        let app: Router = routes(service.clone()).merge(admin_routes(service));
        TestServer::new(app).unwrap()
    }

    async fn new_category(server: &TestServer, name: &str) -> Value {
        let response = server
            .post("/api/gallery/categories")
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let server = server();

        let category = new_category(&server, "Equipos de Rescate").await;
        assert_eq!(category["slug"], "equipos_de_rescate");

        server
            .post("/api/gallery/categories")
            .json(&json!({ "name": "Equipos de Rescate" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        let body: Value = server.get("/api/gallery/categories").await.json();
        assert_eq!(body["meta"]["total"], 1);

        let path = format!("/api/gallery/categories/{}", category["id"].as_str().unwrap());
        server.delete(&path).await.assert_status_ok();
        server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_image_crud_and_filter() {
        let server = server();
        let category = new_category(&server, "Instalaciones").await;
        let title: String = Word().fake();

        let response = server
            .post("/api/gallery/images")
            .json(&json!({
                "category_id": category["id"],
                "src": "/upload/gallery/videos/recorrido.mp4",
                "title": title,
                "type": "video",
                "thumbnail_src": "/upload/gallery/videos/recorrido-poster.jpg"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let image: Value = response.json::<Value>()["data"].clone();
        assert_eq!(image["type"], "video");
        assert_eq!(image["alt"], "");

        let body: Value = server
            .get("/api/gallery/images")
            .add_query_param("category", "instalaciones")
            .await
            .json();
        assert_eq!(body["data"][0]["title"], title.as_str());

        let path = format!("/api/gallery/images/{}", image["id"].as_str().unwrap());
        server
            .put(&path)
            .json(&json!({
                "category_id": category["id"],
                "src": "/upload/gallery/images/recorrido.jpg",
                "title": "Recorrido"
            }))
            .await
            .assert_status_ok();

        let body: Value = server.get("/api/gallery").await.json();
        assert_eq!(body["data"]["instalaciones"][0]["title"], "Recorrido");
        assert_eq!(body["data"]["instalaciones"][0]["type"], "image");

        server.delete(&path).await.assert_status_ok();
        server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_image_without_title_is_rejected() {
        let server = server();
        let category = new_category(&server, "Aulas").await;

        let response = server
            .post("/api/gallery/images")
            .json(&json!({ "category_id": category["id"], "src": "/a.jpg", "title": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_bulk_delete_requires_flag_and_reset_reseeds() {
        let server = server();
        new_category(&server, "Temporal").await;

        server
            .delete("/api/gallery/categories")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let body: Value = server
            .delete("/api/gallery/categories")
            .add_query_param("all", "true")
            .await
            .json();
        assert_eq!(body["data"]["deleted"], 1);

        server.post("/api/gallery/reset").await.assert_status_ok();

        let body: Value = server.get("/api/gallery").await.json();
        let data = body["data"].as_object().unwrap();
        assert_eq!(data.len(), 3);
        assert!(data.contains_key("equipos_de_rescate"));
    }

    #[tokio::test]
    async fn test_unknown_category_filter_is_not_found() {
        let server = server();

        server
            .get("/api/gallery/images")
            .add_query_param("category", "nada")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
