mod content_store;
mod hero_service;

pub use content_store::ContentStore;
pub use hero_service::HeroService;
