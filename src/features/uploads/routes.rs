use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::uploads::handlers::{
    delete_file, get_structure, list_files, move_file, upload_file,
};
use crate::features::uploads::services::UploadService;

/// Public routes for the uploads feature
pub fn routes(upload_service: Arc<UploadService>) -> Router {
    Router::new()
        .route("/api/uploads/structure", get(get_structure))
        .with_state(upload_service)
}

/// Routes that change or reveal stored files
pub fn admin_routes(upload_service: Arc<UploadService>) -> Router {
    // Largest section limit plus a buffer for multipart overhead
    let body_limit = upload_service.max_upload_size() + 1024 * 1024;

    Router::new()
        .route(
            "/api/uploads",
            post(upload_file)
                .layer(DefaultBodyLimit::max(body_limit))
                .get(list_files)
                .delete(delete_file),
        )
        .route("/api/uploads/move", post(move_file))
        .with_state(upload_service)
}
