//! API constants

/// API version segment used in every versioned route.
pub const API_VERSION: &str = "v0";

/// Versioned API prefix, e.g. `/api/v0`.
pub const API_PREFIX: &str = "/api/v0";

/// Path the OpenAPI document is served from.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Extra room on top of the upload limit for multipart boundaries and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10_000;
