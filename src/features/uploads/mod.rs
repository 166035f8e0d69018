pub mod dtos;
pub mod handlers;
pub mod policy;
pub mod routes;
pub mod services;

pub use policy::UploadPolicy;
pub use routes::{admin_routes, routes};
pub use services::UploadService;
