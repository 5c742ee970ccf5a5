//! StudyVault Services
//!
//! The upload intake pipeline, the moderation queue and the public catalog,
//! plus their external collaborators: the relevance classifier and moderator
//! notifications.

pub mod catalog;
pub mod classifier;
pub mod intake;
pub mod moderation;
pub mod notify;
mod publish;

pub use catalog::CatalogService;
pub use classifier::{ClassifierError, DisabledClassifier, RelevanceClassifier};
#[cfg(feature = "openai")]
pub use classifier::{OpenAiClassifier, OpenAiClassifierConfig};
pub use intake::{IntakeService, IntakeSettings};
pub use moderation::ModerationService;
pub use studyvault_core::Decision;
#[cfg(feature = "email")]
pub use notify::EmailNotifier;
pub use notify::{NoopNotifier, Notifier, NotifyError, UploadNotice};
