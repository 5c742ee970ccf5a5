//! Public catalog of published resources and admin statistics.

use std::sync::Arc;

use studyvault_core::models::{CatalogStats, DownloadResponse, ListingQuery, ResourceResponse};
use studyvault_core::AppError;
use studyvault_db::SubmissionStore;
use studyvault_storage::Storage;
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn SubmissionStore>,
    storage: Arc<dyn Storage>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn SubmissionStore>, storage: Arc<dyn Storage>) -> Self {
        Self { store, storage }
    }

    pub async fn search(&self, query: &ListingQuery) -> Result<Vec<ResourceResponse>, AppError> {
        let published = self.store.search_published(query).await?;
        Ok(published
            .into_iter()
            .filter_map(ResourceResponse::from_submission)
            .collect())
    }

    /// Count a download and hand back the public URL.
    pub async fn record_download(&self, id: Uuid) -> Result<DownloadResponse, AppError> {
        let submission = self
            .store
            .increment_downloads(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))?;

        let url = submission
            .public_url()
            .map(str::to_string)
            .ok_or_else(|| AppError::Internal(format!("Resource {} has no URL", id)))?;

        Ok(DownloadResponse {
            id,
            url,
            download_count: submission.download_count,
        })
    }

    pub async fn stats(&self) -> Result<CatalogStats, AppError> {
        self.store.stats().await
    }

    /// Remove a published resource and its stored object.
    #[tracing::instrument(skip(self), fields(resource_id = %id))]
    pub async fn delete_resource(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self
            .store
            .delete_published(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))?;

        if let Some(location) = removed.payload.storage_location() {
            if let Err(e) = self.storage.delete(&location.key).await {
                tracing::warn!(storage_key = %location.key, error = %e, "Failed to delete stored object");
            }
        }
        tracing::info!("Resource deleted");
        Ok(())
    }
}
