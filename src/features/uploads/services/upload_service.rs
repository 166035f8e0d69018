use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::uploads::dtos::{
    FileKind, SectionStructureDto, StoredFileDto, UploadResponseDto,
};
use crate::features::uploads::policy::{FileCandidate, UploadPolicy, UploadRejection, UploadSection};
use crate::modules::storage::{LocalFileStore, StorageError};

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        AppError::Validation(rejection.to_string())
    }
}

/// Convert a storage failure at the service boundary, logging the cause
fn storage_error(action: &str, e: StorageError) -> AppError {
    match e {
        StorageError::InvalidPath(path) => {
            AppError::BadRequest(format!("Invalid file path: {}", path))
        }
        StorageError::Io { .. } => {
            error!("Failed to {}: {}", action, e);
            AppError::Internal(format!("Failed to {}", action))
        }
    }
}

/// A file received from the upload form
#[derive(Debug)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub original_name: String,
    pub mime_type: String,
    pub section: String,
    pub subfolder: Option<String>,
    pub tags: Vec<String>,
    pub kind: Option<FileKind>,
}

/// Service for the upload pipeline: validate, store, enrich
pub struct UploadService {
    policy: Arc<UploadPolicy>,
    store: LocalFileStore,
}

impl UploadService {
    pub fn new(policy: Arc<UploadPolicy>, store: LocalFileStore) -> Self {
        Self { policy, store }
    }

    /// Largest accepted upload in bytes
    pub fn max_upload_size(&self) -> usize {
        self.policy.max_upload_size() as usize
    }

    /// Create the whole folder tree of the policy table
    pub async fn ensure_folders(&self) -> Result<()> {
        self.store
            .ensure_folders(self.policy.layout())
            .await
            .map_err(|e| storage_error("create upload folders", e))
    }

    /// Validate and persist an uploaded file.
    ///
    /// Validation runs before any filesystem access.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResponseDto> {
        let section = request.section.parse::<UploadSection>()?;
        let candidate = FileCandidate {
            original_name: &request.original_name,
            mime_type: &request.mime_type,
            size: request.data.len() as u64,
        };
        self.policy
            .validate(&candidate, section, request.subfolder.as_deref())?;
        let subfolder = match request.subfolder.as_deref() {
            Some(sub) => self.policy.resolve_subfolder(section, Some(sub))?,
            None => self.policy.default_subfolder(section, &request.mime_type)?,
        };

        let record = self
            .store
            .store(
                &request.data,
                &request.original_name,
                &request.mime_type,
                section.as_str(),
                subfolder,
            )
            .await
            .map_err(|e| storage_error("store upload", e))?;

        let kind = request
            .kind
            .unwrap_or_else(|| FileKind::from_mime(&record.mime_type));

        Ok(UploadResponseDto {
            id: Uuid::now_v7(),
            url: record.public_url,
            filename: record.filename,
            original_name: record.original_name,
            kind,
            mime_type: record.mime_type,
            size: record.size,
            width: record.width,
            height: record.height,
            duration: record.duration,
            thumbnail_url: record.thumbnail_url,
            tags: request.tags,
        })
    }

    /// Delete a stored file by public path. `Ok(false)` when it does not exist.
    pub async fn delete(&self, public_path: &str) -> Result<bool> {
        self.store
            .delete(public_path)
            .await
            .map_err(|e| storage_error("delete file", e))
    }

    /// Move a stored file. `Ok(None)` when the source does not exist.
    pub async fn relocate(
        &self,
        public_path: &str,
        section: UploadSection,
        subfolder: &str,
    ) -> Result<Option<String>> {
        let subfolder = self.policy.resolve_subfolder(section, Some(subfolder))?;

        let moved = self
            .store
            .relocate(public_path, section.as_str(), subfolder)
            .await
            .map_err(|e| storage_error("move file", e))?;

        if moved.is_none() {
            info!("Move skipped, source missing: {}", public_path);
        }
        Ok(moved)
    }

    /// Media library listing for a section
    pub async fn list(
        &self,
        section: UploadSection,
        subfolder: Option<&str>,
    ) -> Result<Vec<StoredFileDto>> {
        let subfolder = match subfolder {
            Some(sub) => Some(self.policy.resolve_subfolder(section, Some(sub))?),
            None => None,
        };

        let files = self
            .store
            .list(section.as_str(), subfolder)
            .await
            .map_err(|e| storage_error("list files", e))?;

        Ok(files.into_iter().map(StoredFileDto::from).collect())
    }

    /// The folder-structure table with limits
    pub fn structure(&self) -> Vec<SectionStructureDto> {
        self.policy
            .sections()
            .map(SectionStructureDto::from)
            .collect()
    }
}
