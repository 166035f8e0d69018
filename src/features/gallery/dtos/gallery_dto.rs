use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::gallery::models::{ImageFields, MediaType};

/// Request DTO for creating a gallery category
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Display name; the slug is derived from it
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Equipos de Rescate")]
    pub name: String,
}

/// Query for bulk category deletion
#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteCategoriesQuery {
    /// Must be `true` to delete every category
    #[serde(default)]
    pub all: bool,
}

/// Query for listing images
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListImagesQuery {
    /// Category slug filter
    pub category: Option<String>,
}

/// Request DTO for creating or replacing an image
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ImageDto {
    pub category_id: Uuid,
    #[validate(length(min = 1, message = "src is required"))]
    #[schema(example = "/upload/gallery/images/a1b2c3d4-1700000000000.jpg")]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default)]
    pub media_type: MediaType,
    pub thumbnail_src: Option<String>,
}

impl ImageDto {
    pub fn into_parts(self) -> (Uuid, ImageFields) {
        (
            self.category_id,
            ImageFields {
                src: self.src,
                alt: self.alt,
                title: self.title,
                description: self.description,
                tags: self.tags,
                media_type: self.media_type,
                thumbnail_src: self.thumbnail_src,
            },
        )
    }
}

/// Response DTO for bulk deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedCountDto {
    pub deleted: u64,
}
