//! Relevance classification of document excerpts.

#[cfg(feature = "openai")]
mod openai;

use async_trait::async_trait;
use studyvault_core::models::Verdict;
use studyvault_core::AppError;

#[cfg(feature = "openai")]
pub use openai::{OpenAiClassifier, OpenAiClassifierConfig};

/// Any failure to obtain a usable verdict. The intake pipeline treats every
/// variant the same way: no verdict, hold for review.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier is not configured")]
    Disabled,

    #[error("classifier request failed: {0}")]
    Transport(String),

    #[error("classifier timed out after {0}s")]
    Timeout(u64),

    #[error("classifier returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("classifier response was malformed: {0}")]
    Malformed(String),
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        AppError::ClassifierUnavailable(err.to_string())
    }
}

/// External oracle judging whether an excerpt is study material.
#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    async fn classify(&self, file_name: &str, excerpt: &str) -> Result<Verdict, ClassifierError>;
}

/// Used when no API key is configured. Every PDF ends up in the moderation queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl RelevanceClassifier for DisabledClassifier {
    async fn classify(&self, _file_name: &str, _excerpt: &str) -> Result<Verdict, ClassifierError> {
        Err(ClassifierError::Disabled)
    }
}
