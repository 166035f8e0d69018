mod content_backend;

pub use content_backend::{
    BackendError, ContentBackend, Document, FileContentBackend, MemoryContentBackend,
};
