//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use studyvault_core::models::StorageLocation;
use studyvault_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File {} not found", key)),
            StorageError::UploadFailed(msg) => AppError::StorageWriteFailure(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// Published submissions are written here exactly once and read back by the
/// public listing. Keys follow the layout documented at the crate root.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload under a freshly generated key in `prefix`. Returns (storage_key, storage_url).
    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<(String, String)>;

    /// Upload data to a specific storage key. Returns the public URL.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Download a file as a stream of chunks
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Bucket name, for backends that have one
    fn bucket(&self) -> Option<&str> {
        None
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Durable reference for a key/url pair returned by this backend.
    fn location(&self, key: String, url: String) -> StorageLocation {
        StorageLocation {
            backend: self.backend_type(),
            bucket: self.bucket().map(str::to_string),
            key,
            url,
        }
    }
}
