use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::uploads::policy::{SectionPolicy, UploadSection};
use crate::modules::storage::StoredFile;

/// Broad kind of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Document,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            FileKind::Image
        } else if mime_type.starts_with("video/") {
            FileKind::Video
        } else {
            FileKind::Document
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "image" => Some(FileKind::Image),
            "video" => Some(FileKind::Video),
            "document" => Some(FileKind::Document),
            _ => None,
        }
    }
}

/// Upload form for OpenAPI documentation.
/// The handler reads the multipart fields directly.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Target section: hero, about, services, certifications, gallery or media
    #[schema(example = "gallery")]
    pub section: String,
    /// Folder inside the section (defaults to the section's first folder)
    #[schema(example = "images")]
    pub subfolder: Option<String>,
    /// JSON array or comma separated list
    #[schema(example = "campus,taller")]
    pub tags: Option<String>,
    /// Overrides the detected kind: image, video or document
    #[serde(rename = "type")]
    #[schema(example = "image")]
    pub kind: Option<String>,
}

/// Response DTO for a stored upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub id: Uuid,
    /// Public URL of the file
    pub url: String,
    /// Generated file name
    pub filename: String,
    pub original_name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Video duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub tags: Vec<String>,
}

/// Request DTO for deleting an uploaded file
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileDto {
    /// Public path of the file, e.g. `/upload/gallery/images/a1b2c3d4-1700000000000.jpg`
    #[validate(length(min = 1, message = "filePath is required"))]
    pub file_path: String,
}

/// Query alternative to [`DeleteFileDto`]
#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteFileQuery {
    pub path: Option<String>,
}

/// Request DTO for moving a file to another section/subfolder
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveFileDto {
    #[validate(length(min = 1, message = "filePath is required"))]
    pub file_path: String,
    pub section: UploadSection,
    pub subfolder: String,
}

/// Response DTO for a moved file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoveFileResponseDto {
    pub url: String,
}

/// Query for the media library listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFilesQuery {
    pub section: UploadSection,
    pub subfolder: Option<String>,
}

/// Entry in the media library
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredFileDto {
    pub filename: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: Option<FileKind>,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<StoredFile> for StoredFileDto {
    fn from(f: StoredFile) -> Self {
        Self {
            kind: kind_from_extension(&f.filename),
            filename: f.filename,
            url: f.public_url,
            size: f.size,
            modified_at: f.modified,
        }
    }
}

fn kind_from_extension(filename: &str) -> Option<FileKind> {
    let extension = filename.rsplit_once('.')?.1.to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "webp" | "gif" | "svg" => Some(FileKind::Image),
        "mp4" | "webm" => Some(FileKind::Video),
        "pdf" => Some(FileKind::Document),
        _ => None,
    }
}

/// One row of the folder-structure table
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SectionStructureDto {
    pub section: UploadSection,
    pub folders: Vec<String>,
    pub allowed_types: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub max_size_mb: u64,
}

impl From<&SectionPolicy> for SectionStructureDto {
    fn from(p: &SectionPolicy) -> Self {
        Self {
            section: p.section,
            folders: p.folders.iter().map(|f| f.to_string()).collect(),
            allowed_types: p.allowed_mime_types.iter().map(|m| m.to_string()).collect(),
            allowed_extensions: p
                .allowed_extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_size_mb: p.max_size_mb(),
        }
    }
}

/// Parse the `tags` form field: a JSON array of strings or a comma separated list
pub fn parse_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
            return clean_tags(tags);
        }
    }
    clean_tags(raw.split(',').map(str::to_string).collect())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_accepts_json_and_csv() {
        assert_eq!(parse_tags(r#"["taller", "campus"]"#), vec!["taller", "campus"]);
        assert_eq!(parse_tags("taller, campus ,,taller"), vec!["taller", "campus"]);
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn test_file_kind_from_mime() {
        assert_eq!(FileKind::from_mime("image/webp"), FileKind::Image);
        assert_eq!(FileKind::from_mime("video/mp4"), FileKind::Video);
        assert_eq!(FileKind::from_mime("application/pdf"), FileKind::Document);
        assert_eq!(FileKind::parse(" Video "), Some(FileKind::Video));
        assert_eq!(FileKind::parse("audio"), None);
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(kind_from_extension("a.JPG"), Some(FileKind::Image));
        assert_eq!(kind_from_extension("clip.webm"), Some(FileKind::Video));
        assert_eq!(kind_from_extension("README"), None);
    }
}
