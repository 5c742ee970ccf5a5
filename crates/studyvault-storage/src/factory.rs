#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use studyvault_core::Config;

fn required(value: Option<&str>, var: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", var)))
}

/// Durable storage that approved submissions are published into.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = required(config.s3_bucket(), "S3_BUCKET")?;
            let region = required(config.s3_region(), "S3_REGION")?;
            let storage =
                S3Storage::new(bucket, region, config.s3_endpoint().map(String::from)).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?;
            let base_url = required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?;
            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[allow(unreachable_patterns)]
        other => Err(StorageError::ConfigError(format!(
            "{} storage backend not compiled in (enable the storage-{} feature)",
            other, other
        ))),
    }
}
