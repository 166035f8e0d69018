//! Local filesystem store for uploaded media
//!
//! Files live under `<public_root>/upload/<section>/<subfolder>/<name>` and are
//! addressed by their public URL `/upload/<section>/<subfolder>/<name>`.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::modules::storage::media_probe::MediaProbe;
use crate::shared::constants::UPLOAD_DIR;

const POSTER_SUFFIX: &str = "-poster.jpg";

/// Error type for local storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Metadata for a freshly stored file
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Generated name, unique within the store
    pub filename: String,
    pub original_name: String,
    /// Absolute location on disk
    pub path: PathBuf,
    pub public_url: String,
    pub mime_type: String,
    pub size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Video duration in seconds
    pub duration: Option<f64>,
    /// Poster frame for videos
    pub thumbnail_url: Option<String>,
}

/// A file found while listing a folder
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub public_url: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Local filesystem storage for uploads
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    public_root: PathBuf,
    probe: MediaProbe,
}

impl LocalFileStore {
    pub fn new(public_root: impl Into<PathBuf>, probe: MediaProbe) -> Self {
        Self {
            public_root: public_root.into(),
            probe,
        }
    }

    /// Root of the upload tree on disk
    pub fn upload_root(&self) -> PathBuf {
        self.public_root.join(UPLOAD_DIR)
    }

    /// Create every `(section, subfolder)` directory. Safe to run repeatedly.
    pub async fn ensure_folders<'a>(
        &self,
        layout: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), StorageError> {
        for (section, subfolder) in layout {
            self.ensure_folder(section, subfolder).await?;
        }
        Ok(())
    }

    async fn ensure_folder(&self, section: &str, subfolder: &str) -> Result<PathBuf, StorageError> {
        let dir = self.folder_path(section, subfolder)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(format!("Failed to create {}", dir.display()), e))?;
        Ok(dir)
    }

    /// Persist `data` and return its record.
    ///
    /// Dimensions, duration and poster are best effort: when the external
    /// tools fail the record is returned without them.
    pub async fn store(
        &self,
        data: &[u8],
        original_name: &str,
        mime_type: &str,
        section: &str,
        subfolder: &str,
    ) -> Result<FileRecord, StorageError> {
        let dir = self.ensure_folder(section, subfolder).await?;
        let filename = generate_filename(original_name);
        let path = dir.join(&filename);

        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::io(format!("Failed to write {}", path.display()), e))?;

        debug!(path = %path.display(), bytes = data.len(), "Wrote upload");

        let public_url = public_url(section, subfolder, &filename);
        let mut record = FileRecord {
            filename,
            original_name: original_name.to_string(),
            path,
            public_url,
            mime_type: mime_type.to_string(),
            size: data.len() as u64,
            width: None,
            height: None,
            duration: None,
            thumbnail_url: None,
        };

        self.enrich(&mut record, section, subfolder).await;

        info!(
            "Stored upload: url={}, mime={}, size={}",
            record.public_url, record.mime_type, record.size
        );

        Ok(record)
    }

    async fn enrich(&self, record: &mut FileRecord, section: &str, subfolder: &str) {
        if record.mime_type.starts_with("image/") && record.mime_type != "image/svg+xml" {
            match self.probe.image_dimensions(&record.path).await {
                Ok((width, height)) => {
                    record.width = Some(width);
                    record.height = Some(height);
                }
                Err(e) => warn!("Could not read image dimensions for {}: {}", record.filename, e),
            }
        } else if record.mime_type.starts_with("video/") {
            match self.probe.video_duration(&record.path).await {
                Ok(duration) => record.duration = Some(duration),
                Err(e) => warn!("Could not read video duration for {}: {}", record.filename, e),
            }

            let poster = poster_path(&record.path);
            match self.probe.extract_poster(&record.path, &poster).await {
                Ok(()) => {
                    if let Some(name) = poster.file_name().and_then(|n| n.to_str()) {
                        record.thumbnail_url = Some(public_url(section, subfolder, name));
                    }
                }
                Err(e) => warn!("Could not extract poster for {}: {}", record.filename, e),
            }
        }
    }

    /// Remove the file behind `public_path`.
    ///
    /// Returns `Ok(false)` when there is nothing to delete.
    pub async fn delete(&self, public_path: &str) -> Result<bool, StorageError> {
        let path = self.resolve_public_path(public_path)?;
        if !self.is_stored_file(&path, public_path).await? {
            debug!("Nothing to delete at {}", path.display());
            return Ok(false);
        }

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Nothing to delete at {}", path.display());
                return Ok(false);
            }
            Err(e) => {
                return Err(StorageError::io(
                    format!("Failed to delete {}", path.display()),
                    e,
                ))
            }
        }

        // Companion poster goes with its video
        let poster = poster_path(&path);
        if let Err(e) = fs::remove_file(&poster).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to delete poster {}: {}", poster.display(), e);
            }
        }

        info!("Deleted upload: {}", public_path);
        Ok(true)
    }

    /// Move a stored file into another section/subfolder.
    ///
    /// Returns the new public URL, or `None` when the source does not exist.
    pub async fn relocate(
        &self,
        current_path: &str,
        new_section: &str,
        new_subfolder: &str,
    ) -> Result<Option<String>, StorageError> {
        let source = self.resolve_public_path(current_path)?;
        if !self.is_stored_file(&source, current_path).await? {
            return Ok(None);
        }

        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(current_path.to_string()))?
            .to_string();

        let dest_dir = self.ensure_folder(new_section, new_subfolder).await?;
        let destination = dest_dir.join(&filename);
        move_file(&source, &destination).await?;

        let poster = poster_path(&source);
        if fs::try_exists(&poster).await.unwrap_or(false) {
            if let Err(e) = move_file(&poster, &poster_path(&destination)).await {
                warn!("Failed to move poster {}: {}", poster.display(), e);
            }
        }

        let new_url = public_url(new_section, new_subfolder, &filename);
        info!("Moved upload: {} -> {}", current_path, new_url);
        Ok(Some(new_url))
    }

    /// List files in a section, newest first. Without a subfolder every
    /// subfolder of the section is scanned.
    pub async fn list(
        &self,
        section: &str,
        subfolder: Option<&str>,
    ) -> Result<Vec<StoredFile>, StorageError> {
        let section_dir = self.folder_path(section, subfolder.unwrap_or(""))?;
        let folders: Vec<(String, PathBuf)> = match subfolder {
            Some(sub) => vec![(sub.to_string(), section_dir)],
            None => {
                let mut found = Vec::new();
                let mut entries = match fs::read_dir(&section_dir).await {
                    Ok(entries) => entries,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                    Err(e) => {
                        return Err(StorageError::io(
                            format!("Failed to read {}", section_dir.display()),
                            e,
                        ))
                    }
                };
                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .map_err(|e| StorageError::io("Failed to read directory entry", e))?
                {
                    let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                    if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                        found.push((name.to_string(), entry.path()));
                    }
                }
                found
            }
        };

        let mut files = Vec::new();
        for (sub, dir) in folders {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::io(
                        format!("Failed to read {}", dir.display()),
                        e,
                    ))
                }
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::io("Failed to read directory entry", e))?
            {
                let Ok(metadata) = entry.metadata().await else {
                    continue;
                };
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if !metadata.is_file() || name.ends_with(POSTER_SUFFIX) {
                    continue;
                }

                files.push(StoredFile {
                    public_url: public_url(section, &sub, &name),
                    filename: name,
                    size: metadata.len(),
                    modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(files)
    }

    /// `Ok(false)` when nothing is at `path`; `InvalidPath` when something
    /// other than a regular file is.
    async fn is_stored_file(&self, path: &Path, public_path: &str) -> Result<bool, StorageError> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => Ok(true),
            Ok(_) => Err(StorageError::InvalidPath(public_path.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(
                format!("Failed to inspect {}", path.display()),
                e,
            )),
        }
    }

    /// Map a public URL such as `/upload/gallery/images/a.jpg` to its location
    /// on disk. Only `<section>/<subfolder>/<file>` under the upload tree is
    /// accepted.
    pub fn resolve_public_path(&self, public_path: &str) -> Result<PathBuf, StorageError> {
        let trimmed = public_path.trim().trim_start_matches('/');
        let relative = trimmed
            .strip_prefix(UPLOAD_DIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidPath(public_path.to_string()))?;

        let relative = Path::new(relative);
        let depth = relative.components().count();
        let all_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if depth != 3 || !all_normal {
            return Err(StorageError::InvalidPath(public_path.to_string()));
        }

        Ok(self.upload_root().join(relative))
    }

    fn folder_path(&self, section: &str, subfolder: &str) -> Result<PathBuf, StorageError> {
        if !is_plain_segment(section) || !(subfolder.is_empty() || is_plain_segment(subfolder)) {
            return Err(StorageError::InvalidPath(format!("{}/{}", section, subfolder)));
        }
        let mut dir = self.upload_root().join(section);
        if !subfolder.is_empty() {
            dir.push(subfolder);
        }
        Ok(dir)
    }
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !segment.contains(['/', '\\'])
}

fn public_url(section: &str, subfolder: &str, filename: &str) -> String {
    format!("/{}/{}/{}/{}", UPLOAD_DIR, section, subfolder, filename)
}

fn poster_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    path.with_file_name(format!("{}{}", stem, POSTER_SUFFIX))
}

async fn move_file(from: &Path, to: &Path) -> Result<(), StorageError> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    // rename fails across filesystems; fall back to copy + remove
    fs::copy(from, to).await.map_err(|e| {
        StorageError::io(
            format!("Failed to copy {} -> {}", from.display(), to.display()),
            e,
        )
    })?;
    fs::remove_file(from)
        .await
        .map_err(|e| StorageError::io(format!("Failed to remove {}", from.display()), e))
}

/// Collision-resistant name: 8 random hex chars, a millisecond timestamp and
/// the original (lowercased) extension.
pub fn generate_filename(original_name: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}{}",
        &random[..8],
        Utc::now().timestamp_millis(),
        extension
    )
}
