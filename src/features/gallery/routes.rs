use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::gallery::handlers::{
    create_category, create_image, delete_all_categories, delete_category, delete_image,
    get_gallery, list_categories, list_images, reset_gallery, update_image,
};
use crate::features::gallery::services::GalleryService;

/// Public routes for the gallery
pub fn routes(gallery_service: Arc<GalleryService>) -> Router {
    Router::new()
        .route("/api/gallery", get(get_gallery))
        .route("/api/gallery/categories", get(list_categories))
        .route("/api/gallery/images", get(list_images))
        .with_state(gallery_service)
}

/// Gallery routes that modify categories or images
pub fn admin_routes(gallery_service: Arc<GalleryService>) -> Router {
    Router::new()
        .route(
            "/api/gallery/categories",
            post(create_category).delete(delete_all_categories),
        )
        .route("/api/gallery/categories/{id}", delete(delete_category))
        .route("/api/gallery/images", post(create_image))
        .route(
            "/api/gallery/images/{id}",
            put(update_image).delete(delete_image),
        )
        .route("/api/gallery/reset", post(reset_gallery))
        .with_state(gallery_service)
}
