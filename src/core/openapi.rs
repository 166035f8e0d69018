use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::content::{
    dtos as content_dtos, handlers as content_handlers, models as content_models,
};
use crate::features::gallery::{
    dtos as gallery_dtos, handlers as gallery_handlers, models as gallery_models,
};
use crate::features::uploads::{
    dtos as uploads_dtos, handlers as uploads_handlers, policy as uploads_policy,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Uploads
        uploads_handlers::upload_file,
        uploads_handlers::delete_file,
        uploads_handlers::move_file,
        uploads_handlers::list_files,
        uploads_handlers::get_structure,
        // Content
        content_handlers::get_all_content,
        content_handlers::get_section,
        content_handlers::update_section,
        content_handlers::reset_content,
        content_handlers::content_events_stream,
        content_handlers::get_hero,
        content_handlers::save_hero,
        // Gallery
        gallery_handlers::get_gallery,
        gallery_handlers::list_categories,
        gallery_handlers::create_category,
        gallery_handlers::delete_all_categories,
        gallery_handlers::delete_category,
        gallery_handlers::list_images,
        gallery_handlers::create_image,
        gallery_handlers::update_image,
        gallery_handlers::delete_image,
        gallery_handlers::reset_gallery,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Uploads
            uploads_policy::UploadSection,
            uploads_dtos::FileKind,
            uploads_dtos::UploadFileDto,
            uploads_dtos::UploadResponseDto,
            uploads_dtos::DeleteFileDto,
            uploads_dtos::MoveFileDto,
            uploads_dtos::MoveFileResponseDto,
            uploads_dtos::StoredFileDto,
            uploads_dtos::SectionStructureDto,
            ApiResponse<uploads_dtos::UploadResponseDto>,
            ApiResponse<uploads_dtos::MoveFileResponseDto>,
            ApiResponse<Vec<uploads_dtos::StoredFileDto>>,
            ApiResponse<Vec<uploads_dtos::SectionStructureDto>>,
            // Content
            content_models::SectionKind,
            content_dtos::HeroContentDto,
            // Gallery
            gallery_models::GalleryCategory,
            gallery_models::GalleryImage,
            gallery_models::MediaType,
            gallery_dtos::CreateCategoryDto,
            gallery_dtos::ImageDto,
            gallery_dtos::DeletedCountDto,
            ApiResponse<gallery_models::GalleryCategory>,
            ApiResponse<Vec<gallery_models::GalleryCategory>>,
            ApiResponse<gallery_models::GalleryImage>,
            ApiResponse<Vec<gallery_models::GalleryImage>>,
            ApiResponse<gallery_dtos::DeletedCountDto>,
        )
    ),
    tags(
        (name = "uploads", description = "File uploads and media library"),
        (name = "content", description = "Site content sections and hero"),
        (name = "gallery", description = "Gallery categories and images"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Institute Site API",
        version = "0.1.0",
        description = "API documentation for the institute site backend",
    )
)]
pub struct ApiDoc;

/// Adds HTTP basic auth security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_feature() {
        let doc = ApiDoc::openapi();

        for path in ["/api/uploads", "/api/content/{section}", "/api/hero", "/api/gallery/images/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("basic_auth"));
    }
}
