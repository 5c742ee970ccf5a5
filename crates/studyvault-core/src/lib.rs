//! StudyVault Core Library
//!
//! Domain models, the submission lifecycle, the admission policy, error types and
//! configuration shared by every StudyVault component.

pub mod admission;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use admission::{decide, decide_unclassified, AdmissionDecision, NonPdfPolicy};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use lifecycle::{Decision, Review, ReviewDecision, Transition};
pub use storage_types::StorageBackend;
