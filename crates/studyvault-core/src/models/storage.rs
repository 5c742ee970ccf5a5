//! Durable payload reference for published submissions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage_types::StorageBackend;

/// Where a published submission's bytes live and how the public reaches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StorageLocation {
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    pub key: String,
    pub url: String,
}
