//! StudyVault Processing Library
//!
//! Document format detection, upload validation and bounded text extraction
//! for the relevance classifier.

pub mod extract;
pub mod kind;
pub mod validator;

// Re-export commonly used types
pub use extract::{excerpt_from_pages, ExtractionError, TextExtractor};
#[cfg(feature = "pdf")]
pub use extract::{extract_excerpt, PdfTextExtractor};
pub use kind::DocumentKind;
pub use validator::{UploadValidator, ValidationError};
