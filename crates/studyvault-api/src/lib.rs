//! StudyVault API Library
//!
//! HTTP handlers, OpenAPI document and application setup for the upload
//! intake and moderation service.

mod api_doc;
pub mod auth;
pub mod constants;
mod handlers;
pub mod setup;
pub mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, HttpConfig};
