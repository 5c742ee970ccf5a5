//! Moderator notifications.
//!
//! Delivery is best effort: callers log failures and carry on.

#[cfg(feature = "email")]
mod email;

use async_trait::async_trait;
use studyvault_core::models::{Submission, SubmissionStatus};

#[cfg(feature = "email")]
pub use email::EmailNotifier;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("message could not be built: {0}")]
    Message(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// What moderators are told about a new upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNotice {
    pub file_name: String,
    pub submitter: String,
    pub subject: String,
    pub department: String,
    pub category: String,
    pub status: SubmissionStatus,
}

impl From<&Submission> for UploadNotice {
    fn from(s: &Submission) -> Self {
        Self {
            file_name: s.file_name.clone(),
            submitter: s.submitter.clone(),
            subject: s.subject.clone(),
            department: s.department.clone(),
            category: s.category.label().to_string(),
            status: s.status,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &UploadNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, notice: &UploadNotice) -> Result<(), NotifyError> {
        tracing::debug!(file_name = %notice.file_name, "Notifications disabled, skipping");
        Ok(())
    }
}
