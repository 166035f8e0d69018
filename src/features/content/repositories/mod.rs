mod hero_repository;

#[cfg(test)]
pub use hero_repository::MemoryHeroRepository;
pub use hero_repository::{HeroRepository, PgHeroRepository};
