use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored content is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Local storage for the site content document
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// The document stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<Document>, BackendError>;

    /// Replace the document stored under `key`
    async fn save(&self, key: &str, document: &Document) -> Result<(), BackendError>;
}

/// Process-local backend. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryContentBackend {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryContentBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentBackend for MemoryContentBackend {
    async fn load(&self, key: &str) -> Result<Option<Document>, BackendError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, document: &Document) -> Result<(), BackendError> {
        self.documents
            .write()
            .await
            .insert(key.to_string(), document.clone());
        Ok(())
    }
}

/// JSON file backend. The file holds one object keyed by storage key and is
/// replaced atomically on every save.
pub struct FileContentBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileContentBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Document, BackendError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(BackendError::Io {
                context: format!("Failed to read {}", self.path.display()),
                source: e,
            }),
        }
    }
}

#[async_trait]
impl ContentBackend for FileContentBackend {
    async fn load(&self, key: &str) -> Result<Option<Document>, BackendError> {
        let mut all = self.read_all().await?;
        Ok(match all.remove(key) {
            Some(Value::Object(document)) => Some(document),
            _ => None,
        })
    }

    async fn save(&self, key: &str, document: &Document) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        all.insert(key.to_string(), Value::Object(document.clone()));
        let bytes = serde_json::to_vec_pretty(&all)?;

        let io_err =
            |context: String| move |source: std::io::Error| BackendError::Io { context, source };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(io_err(format!("Failed to create {}", parent.display())))?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)
            .await
            .map_err(io_err(format!("Failed to write {}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(io_err(format!("Failed to replace {}", self.path.display())))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Saved content document");
        Ok(())
    }
}
