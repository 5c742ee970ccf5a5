//! Moving staged bytes into durable storage.

use bytes::Bytes;
use studyvault_core::models::{StorageLocation, Submission};
use studyvault_core::AppError;
use studyvault_storage::Storage;

/// Upload a submission's bytes under `{category}/...`.
pub(crate) async fn store_payload(
    storage: &dyn Storage,
    submission: &Submission,
    data: Bytes,
) -> Result<StorageLocation, AppError> {
    let size = data.len();
    let (key, url) = storage
        .upload(
            submission.category.as_str(),
            &submission.file_name,
            &submission.content_type,
            data,
        )
        .await
        .map_err(|e| AppError::StorageWriteFailure(e.to_string()))?;

    tracing::debug!(
        submission_id = %submission.id,
        storage_key = %key,
        size_bytes = size,
        "Submission payload stored"
    );
    Ok(storage.location(key, url))
}

/// Remove an object whose database transition did not happen.
pub(crate) async fn discard_payload(storage: &dyn Storage, location: &StorageLocation) {
    if let Err(e) = storage.delete(&location.key).await {
        tracing::error!(
            storage_key = %location.key,
            error = %e,
            "Failed to delete orphaned object after failed transition"
        );
    }
}
