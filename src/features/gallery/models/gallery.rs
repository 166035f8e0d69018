use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GalleryCategory {
    pub id: Uuid,
    pub name: String,
    /// Derived from the name: lowercase, whitespace runs replaced by `_`
    pub slug: String,
}

/// How `src` is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    fn from_db(value: &str) -> Self {
        match value {
            "video" => MediaType::Video,
            _ => MediaType::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GalleryImage {
    pub id: Uuid,
    pub category_id: Uuid,
    pub src: String,
    pub alt: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Poster for videos
    pub thumbnail_src: Option<String>,
}

/// Editable fields of an image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageFields {
    pub src: String,
    pub alt: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub media_type: MediaType,
    pub thumbnail_src: Option<String>,
}

impl ImageFields {
    pub fn into_image(self, id: Uuid, category_id: Uuid) -> GalleryImage {
        GalleryImage {
            id,
            category_id,
            src: self.src,
            alt: self.alt,
            title: self.title,
            description: self.description,
            tags: self.tags,
            media_type: self.media_type,
            thumbnail_src: self.thumbnail_src,
        }
    }
}

/// `gallery_images` row
#[derive(Debug, FromRow)]
pub struct GalleryImageRow {
    pub id: Uuid,
    pub category_id: Uuid,
    pub src: String,
    pub alt: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub media_type: String,
    pub thumbnail_src: Option<String>,
}

impl From<GalleryImageRow> for GalleryImage {
    fn from(row: GalleryImageRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            src: row.src,
            alt: row.alt,
            title: row.title,
            description: row.description,
            tags: row.tags,
            media_type: MediaType::from_db(&row.media_type),
            thumbnail_src: row.thumbnail_src,
        }
    }
}

/// A category and its images, inserted together on reset
#[derive(Debug, Clone)]
pub struct CategorySeed {
    pub name: String,
    pub slug: String,
    pub images: Vec<ImageFields>,
}
