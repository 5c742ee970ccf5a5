//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use studyvault_core::Config;
use studyvault_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = storage.bucket().unwrap_or("-"),
        "Storage initialized"
    );
    Ok(storage)
}
