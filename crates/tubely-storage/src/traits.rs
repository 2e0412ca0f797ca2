//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tubely_core::models::InvalidReference;
use tubely_core::{AppError, StorageReference};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid storage reference: {0}")]
    InvalidReference(#[from] InvalidReference),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidReference(e) => AppError::Signing(e.to_string()),
            StorageError::SigningFailed(msg) => AppError::Signing(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// upload pipeline can place objects and mint access URLs without knowing
/// which backend is configured.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket (or container) new objects are placed in.
    fn bucket(&self) -> &str;

    /// Upload the full contents of a local file under `key`, recording
    /// `content_type` as object metadata.
    ///
    /// Never retries; a failure leaves no reference behind.
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<StorageReference>;

    /// Generate a presigned/temporary URL authorizing a GET of the object.
    async fn presigned_get_url(
        &self,
        reference: &StorageReference,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, reference: &StorageReference) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
