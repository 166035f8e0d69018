mod gallery_service;

pub use gallery_service::{GalleryData, GalleryService};
