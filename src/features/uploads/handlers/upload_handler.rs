use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::uploads::dtos::{
    parse_tags, DeleteFileDto, DeleteFileQuery, FileKind, ListFilesQuery, MoveFileDto,
    MoveFileResponseDto, SectionStructureDto, StoredFileDto, UploadFileDto, UploadResponseDto,
};
use crate::features::uploads::services::{UploadRequest, UploadService};
use crate::shared::types::{ApiResponse, Meta};

async fn text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

/// Upload a file into a section
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `section`: Target section (required)
/// - `subfolder`: Folder inside the section (optional)
/// - `tags`: JSON array or comma separated list (optional)
/// - `type`: Overrides the detected kind (optional)
#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "uploads",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with target section and optional subfolder, tags and type",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<UploadResponseDto>),
        (status = 400, description = "Invalid file or validation error"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn upload_file(
    State(service): State<Arc<UploadService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponseDto>>), AppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut section: Option<String> = None;
    let mut subfolder: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut kind: Option<FileKind> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file = Some((data.to_vec(), file_name, content_type));
            }
            "section" => {
                let text = text_field(field, "section").await?;
                if !text.is_empty() {
                    section = Some(text);
                }
            }
            "subfolder" => {
                let text = text_field(field, "subfolder").await?;
                if !text.is_empty() {
                    subfolder = Some(text);
                }
            }
            "tags" => {
                tags = parse_tags(&text_field(field, "tags").await?);
            }
            "type" => {
                let text = text_field(field, "type").await?;
                if !text.is_empty() {
                    kind = Some(FileKind::parse(&text).ok_or_else(|| {
                        AppError::Validation(format!(
                            "Invalid type '{}'. Allowed: image, video, document",
                            text
                        ))
                    })?);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (data, original_name, mime_type) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let section = section.ok_or_else(|| AppError::BadRequest("Section is required".to_string()))?;

    let response = service
        .upload(UploadRequest {
            data,
            original_name,
            mime_type,
            section,
            subfolder,
            tags,
            kind,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Delete an uploaded file
///
/// The path comes from the JSON body `{ "filePath": ... }` or the `path` query parameter.
#[utoipa::path(
    delete,
    path = "/api/uploads",
    tag = "uploads",
    params(DeleteFileQuery),
    request_body(content = Option<DeleteFileDto>, content_type = "application/json"),
    responses(
        (status = 200, description = "File deleted successfully"),
        (status = 400, description = "Missing or invalid file path"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_file(
    State(service): State<Arc<UploadService>>,
    Query(query): Query<DeleteFileQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let file_path = if body.iter().any(|b| !b.is_ascii_whitespace()) {
        let dto: DeleteFileDto = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        dto.file_path
    } else {
        query
            .path
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("File path is required".to_string()))?
    };

    if !service.delete(&file_path).await? {
        return Err(AppError::NotFound(format!("File not found: {}", file_path)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("File deleted successfully".to_string()),
        None,
    )))
}

/// Move an uploaded file to another section or subfolder
#[utoipa::path(
    post,
    path = "/api/uploads/move",
    tag = "uploads",
    request_body = MoveFileDto,
    responses(
        (status = 200, description = "File moved", body = ApiResponse<MoveFileResponseDto>),
        (status = 400, description = "Invalid destination"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn move_file(
    State(service): State<Arc<UploadService>>,
    AppJson(dto): AppJson<MoveFileDto>,
) -> Result<Json<ApiResponse<MoveFileResponseDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let url = service
        .relocate(&dto.file_path, dto.section, &dto.subfolder)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File not found: {}", dto.file_path)))?;

    Ok(Json(ApiResponse::success(
        Some(MoveFileResponseDto { url }),
        None,
        None,
    )))
}

/// List uploaded files of a section
#[utoipa::path(
    get,
    path = "/api/uploads",
    tag = "uploads",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files in the section, newest first", body = ApiResponse<Vec<StoredFileDto>>),
        (status = 400, description = "Unknown section or subfolder"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn list_files(
    State(service): State<Arc<UploadService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<StoredFileDto>>>, AppError> {
    let files = service
        .list(query.section, query.subfolder.as_deref())
        .await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Describe the upload folder structure and limits
#[utoipa::path(
    get,
    path = "/api/uploads/structure",
    tag = "uploads",
    responses(
        (status = 200, description = "Sections with folders, types and size limits", body = ApiResponse<Vec<SectionStructureDto>>)
    )
)]
pub async fn get_structure(
    State(service): State<Arc<UploadService>>,
) -> Json<ApiResponse<Vec<SectionStructureDto>>> {
    Json(ApiResponse::success(Some(service.structure()), None, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::uploads::policy::UploadPolicy;
    use crate::features::uploads::routes::{admin_routes, routes};
    use crate::modules::storage::{LocalFileStore, MediaProbe};
    use axum::Router;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server(root: &std::path::Path) -> TestServer {
        let policy = Arc::new(UploadPolicy::with_overrides(&[]).unwrap());
        let store = LocalFileStore::new(
            root,
            MediaProbe::new("no-identify", "no-ffprobe", "no-ffmpeg"),
        );
        let service = Arc::new(UploadService::new(policy, store));
        let app: Router = routes(service.clone()).merge(admin_routes(service));
        TestServer::new(app).unwrap()
    }

    fn image_form(section: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("section", section)
            .add_text("tags", "campus, taller")
            .add_part(
                "file",
                Part::bytes(vec![1u8, 2, 3, 4])
                    .file_name("Foto Taller.JPG")
                    .mime_type("image/jpeg"),
            )
    }

    #[tokio::test]
    async fn test_upload_then_delete_by_body() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server.post("/api/uploads").multipart(image_form("gallery")).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["type"], "image");
        assert_eq!(body["data"]["tags"], json!(["campus", "taller"]));
        let url = body["data"]["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/upload/gallery/images/"));
        assert!(url.ends_with(".jpg"));

        let response = server
            .delete("/api/uploads")
            .json(&json!({ "filePath": url }))
            .await;
        response.assert_status_ok();

        let response = server
            .delete("/api/uploads")
            .json(&json!({ "filePath": url }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_requires_section() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0u8; 4])
                .file_name("a.png")
                .mime_type("image/png"),
        );
        let response = server.post("/api/uploads").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let form = MultipartForm::new().add_text("section", "about").add_part(
            "file",
            Part::bytes(vec![0u8; 4])
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        );
        let response = server.post("/api/uploads").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_delete_by_query_and_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server.post("/api/uploads").multipart(image_form("media")).await;
        let body: Value = response.json();
        let url = body["data"]["url"].as_str().unwrap().to_string();

        let response = server
            .delete("/api/uploads")
            .add_query_param("path", &url)
            .await;
        response.assert_status_ok();

        let response = server.delete("/api/uploads").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_move_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server.post("/api/uploads").multipart(image_form("media")).await;
        let body: Value = response.json();
        let url = body["data"]["url"].as_str().unwrap().to_string();

        let response = server
            .post("/api/uploads/move")
            .json(&json!({ "filePath": url, "section": "gallery", "subfolder": "thumbnails" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let moved = body["data"]["url"].as_str().unwrap();
        assert!(moved.starts_with("/upload/gallery/thumbnails/"));

        let response = server
            .get("/api/uploads")
            .add_query_param("section", "gallery")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["url"], moved);
    }

    #[tokio::test]
    async fn test_move_and_delete_reject_folder_paths() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server.post("/api/uploads").multipart(image_form("gallery")).await;
        let body: Value = response.json();
        let url = body["data"]["url"].as_str().unwrap().to_string();

        let response = server
            .post("/api/uploads/move")
            .json(&json!({ "filePath": "/upload/gallery/images", "section": "about", "subfolder": "images" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .delete("/api/uploads")
            .json(&json!({ "filePath": "/upload/gallery" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/uploads")
            .add_query_param("section", "gallery")
            .await;
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["url"], url);
    }

    #[tokio::test]
    async fn test_structure_lists_every_section() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let response = server.get("/api/uploads/structure").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
    }
}
