//! Application state shared by every handler.

use std::sync::Arc;

use sqlx::PgPool;
use studyvault_core::Config;
use studyvault_services::{CatalogService, IntakeService, ModerationService};
use studyvault_storage::Storage;

use crate::constants::{DEFAULT_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};

/// HTTP-level settings the router needs.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub cors_origins: Vec<String>,
    /// Upper bound on any request body, multipart framing included.
    pub max_body_bytes: usize,
    /// In-flight request cap for the whole server.
    pub concurrency_limit: usize,
    /// Bearer token guarding the moderation and admin routes.
    pub moderator_api_key: String,
}

impl HttpConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cors_origins: config.cors_origins().to_vec(),
            max_body_bytes: config.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES,
            concurrency_limit: std::env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CONCURRENCY_LIMIT)
                .max(1),
            moderator_api_key: config.moderator_api_key().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub intake: IntakeService,
    pub moderation: ModerationService,
    pub catalog: CatalogService,
    /// Durable storage, read directly by the file route.
    pub storage: Arc<dyn Storage>,
    /// `None` when running against a non-Postgres store (tests).
    pub pool: Option<PgPool>,
    pub http: HttpConfig,
}
