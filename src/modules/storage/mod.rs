//! Storage module for uploaded media
//!
//! Provides the local filesystem store that backs the public `/upload` tree
//! and the external tooling used to enrich stored files.

mod local_store;
mod media_probe;

pub use local_store::{LocalFileStore, StorageError, StoredFile};
pub use media_probe::MediaProbe;
