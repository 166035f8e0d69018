pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod services;

pub use routes::{admin_routes, routes};
pub use services::GalleryService;
