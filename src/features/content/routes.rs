use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::content::handlers::{
    content_events_stream, get_all_content, get_hero, get_section, reset_content, save_hero,
    update_section,
};
use crate::features::content::services::{ContentStore, HeroService};

/// Public routes for the content store
pub fn routes(store: Arc<ContentStore>) -> Router {
    Router::new()
        .route("/api/content", get(get_all_content))
        .route("/api/content/events", get(content_events_stream))
        .route("/api/content/{section}", get(get_section))
        .with_state(store)
}

/// Content store routes that modify content
pub fn admin_routes(store: Arc<ContentStore>) -> Router {
    Router::new()
        .route("/api/content/reset", post(reset_content))
        .route("/api/content/{section}", put(update_section))
        .with_state(store)
}

pub fn hero_routes(service: Arc<HeroService>) -> Router {
    Router::new()
        .route("/api/hero", get(get_hero))
        .with_state(service)
}

pub fn hero_admin_routes(service: Arc<HeroService>) -> Router {
    Router::new()
        .route("/api/hero", post(save_hero))
        .with_state(service)
}
