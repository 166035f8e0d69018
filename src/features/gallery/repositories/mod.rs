mod gallery_repository;
#[cfg(test)]
mod memory_gallery_repository;
mod pg_gallery_repository;

pub use gallery_repository::GalleryRepository;
#[cfg(test)]
pub use memory_gallery_repository::MemoryGalleryRepository;
pub use pg_gallery_repository::PgGalleryRepository;
