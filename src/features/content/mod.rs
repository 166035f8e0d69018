pub mod backends;
pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::{admin_routes, hero_admin_routes, hero_routes, routes};
pub use services::{ContentStore, HeroService};
