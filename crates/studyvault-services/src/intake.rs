//! Upload intake pipeline.
//!
//! validate → persist (intake) → extract → classify → admission policy →
//! publish or hold → notify moderators.
//!
//! Extraction and classification failures never fail the request; they only
//! mean "no verdict", which the admission policy routes to review. Every
//! accepted upload leaves this service in `published` or `pending_review`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use studyvault_core::models::{IntakeOutcome, NewSubmission, Submission, SubmissionStatus, Verdict};
use studyvault_core::{
    decide, decide_unclassified, AdmissionDecision, AppError, Config, NonPdfPolicy,
};
use studyvault_db::SubmissionStore;
use studyvault_processing::{TextExtractor, UploadValidator};
use studyvault_storage::Storage;
use uuid::Uuid;
use validator::Validate;

use crate::classifier::RelevanceClassifier;
use crate::notify::{Notifier, UploadNotice};
use crate::publish::{discard_payload, store_payload};

#[derive(Debug, Clone)]
pub struct IntakeSettings {
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub departments: Vec<String>,
    pub page_cap: usize,
    pub classifier_timeout: Duration,
    pub non_pdf_policy: NonPdfPolicy,
    pub notify_on_every_intake: bool,
}

impl IntakeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes(),
            allowed_extensions: config.allowed_extensions().to_vec(),
            departments: config.departments().to_vec(),
            page_cap: config.extraction_page_cap(),
            classifier_timeout: Duration::from_secs(config.classifier_timeout_secs()),
            non_pdf_policy: config.non_pdf_policy(),
            notify_on_every_intake: config.notify_on_every_intake(),
        }
    }
}

#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn SubmissionStore>,
    storage: Arc<dyn Storage>,
    extractor: Arc<dyn TextExtractor>,
    classifier: Arc<dyn RelevanceClassifier>,
    notifier: Arc<dyn Notifier>,
    validator: UploadValidator,
    settings: IntakeSettings,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        storage: Arc<dyn Storage>,
        extractor: Arc<dyn TextExtractor>,
        classifier: Arc<dyn RelevanceClassifier>,
        notifier: Arc<dyn Notifier>,
        settings: IntakeSettings,
    ) -> Self {
        let validator = UploadValidator::new(
            settings.max_upload_bytes,
            settings.allowed_extensions.clone(),
        );
        Self {
            store,
            storage,
            extractor,
            classifier,
            notifier,
            validator,
            settings,
        }
    }

    pub fn settings(&self) -> &IntakeSettings {
        &self.settings
    }

    /// Current view of a submission.
    pub async fn status(&self, id: Uuid) -> Result<Submission, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))
    }

    fn check_department(&self, department: &str) -> Result<(), AppError> {
        if self
            .settings
            .departments
            .iter()
            .any(|d| d.eq_ignore_ascii_case(department.trim()))
        {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "Unknown department: {}",
                department
            )))
        }
    }

    #[tracing::instrument(
        skip(self, new),
        fields(file_name = %new.file_name, size_bytes = new.data.len(), category = %new.category)
    )]
    pub async fn submit(&self, new: NewSubmission) -> Result<IntakeOutcome, AppError> {
        new.validate()?;
        self.check_department(&new.department)?;
        let kind = self
            .validator
            .validate_all(&new.file_name, &new.content_type, &new.data)?;

        let data = new.data.clone();
        let submission = self.store.create(new).await?;
        tracing::info!(submission_id = %submission.id, kind = %kind, "Submission received");

        let (decision, verdict) = if kind.is_classifiable() {
            let verdict = self.classify(&submission, data.clone()).await;
            (decide(verdict.as_ref()), verdict)
        } else {
            (decide_unclassified(self.settings.non_pdf_policy), None)
        };

        tracing::info!(
            submission_id = %submission.id,
            decision = %decision,
            confidence = verdict.as_ref().map(|v| v.confidence),
            is_study_related = verdict.as_ref().map(|v| v.is_study_related),
            "Admission decision"
        );

        let settled = match decision {
            AdmissionDecision::AutoPublish => {
                match self.publish(&submission, data, verdict.clone()).await {
                    Ok(published) => published,
                    Err(e) => {
                        tracing::warn!(
                            submission_id = %submission.id,
                            error = %e,
                            "Auto-publish failed, holding for review"
                        );
                        self.store.hold_for_review(submission.id, verdict).await?
                    }
                }
            }
            AdmissionDecision::HoldForReview => {
                self.store.hold_for_review(submission.id, verdict).await?
            }
        };

        let held = settled.status == SubmissionStatus::PendingReview;
        if held || self.settings.notify_on_every_intake {
            self.notify(&settled).await;
        }

        Ok(IntakeOutcome {
            id: settled.id,
            status: settled.status,
            verdict: settled.verdict,
        })
    }

    /// Extract and classify. Any failure yields no verdict.
    async fn classify(&self, submission: &Submission, data: Bytes) -> Option<Verdict> {
        let excerpt = match self.extractor.extract(data, self.settings.page_cap).await {
            Ok(excerpt) => excerpt,
            Err(e) => {
                tracing::warn!(
                    submission_id = %submission.id,
                    error = %e,
                    "Text extraction failed, skipping classification"
                );
                return None;
            }
        };

        let call = self.classifier.classify(&submission.file_name, &excerpt);
        match tokio::time::timeout(self.settings.classifier_timeout, call).await {
            Ok(Ok(verdict)) => Some(verdict),
            Ok(Err(e)) => {
                tracing::warn!(submission_id = %submission.id, error = %e, "Classifier unavailable");
                None
            }
            Err(_) => {
                tracing::warn!(
                    submission_id = %submission.id,
                    timeout_secs = self.settings.classifier_timeout.as_secs(),
                    "Classifier timed out"
                );
                None
            }
        }
    }

    async fn publish(
        &self,
        submission: &Submission,
        data: Bytes,
        verdict: Option<Verdict>,
    ) -> Result<Submission, AppError> {
        let location = store_payload(self.storage.as_ref(), submission, data).await?;
        match self
            .store
            .promote_to_published(submission.id, verdict, location.clone())
            .await
        {
            Ok(published) => Ok(published),
            Err(e) => {
                discard_payload(self.storage.as_ref(), &location).await;
                Err(e)
            }
        }
    }

    async fn notify(&self, submission: &Submission) {
        let notice = UploadNotice::from(submission);
        if let Err(e) = self.notifier.notify(&notice).await {
            tracing::warn!(
                submission_id = %submission.id,
                error = %e,
                "Failed to notify moderators"
            );
        }
    }
}
