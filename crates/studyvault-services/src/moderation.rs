//! Moderation queue: held submissions and human decisions.

use std::sync::Arc;

use studyvault_core::models::{Submission, SubmissionStatus, MAX_LISTING_LIMIT};
use studyvault_core::{AppError, Decision, Review, ReviewDecision};
use studyvault_db::SubmissionStore;
use studyvault_storage::Storage;
use uuid::Uuid;

use crate::publish::{discard_payload, store_payload};

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn SubmissionStore>,
    storage: Arc<dyn Storage>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn SubmissionStore>, storage: Arc<dyn Storage>) -> Self {
        Self { store, storage }
    }

    /// Held submissions, newest first.
    pub async fn list_pending(&self, limit: i64, offset: i64) -> Result<Vec<Submission>, AppError> {
        self.store
            .list_by_status(
                SubmissionStatus::PendingReview,
                limit.clamp(1, MAX_LISTING_LIMIT),
                offset.max(0),
            )
            .await
    }

    /// Finalize a held submission.
    ///
    /// Approval uploads the staged bytes before the status changes; if the
    /// status change then fails, the uploaded object is removed again.
    /// Rejection is irreversible.
    #[tracing::instrument(skip(self, review), fields(submission_id = %id, decision = %decision))]
    pub async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        review: Review,
    ) -> Result<Submission, AppError> {
        let submission = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;

        if submission.status != SubmissionStatus::PendingReview {
            return Err(AppError::InvalidStateTransition {
                from: submission.status,
                to: decision.target(),
            });
        }

        let finalized = match decision {
            Decision::Approve => self.approve(&submission, review).await?,
            Decision::Reject => {
                self.store
                    .finalize_review(id, ReviewDecision::Reject, review)
                    .await?
            }
        };

        tracing::info!(
            status = %finalized.status,
            reviewer = finalized.reviewed_by.as_deref().unwrap_or("-"),
            "Moderation decision applied"
        );
        Ok(finalized)
    }

    async fn approve(&self, submission: &Submission, review: Review) -> Result<Submission, AppError> {
        let data = self.store.inline_payload(submission.id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "Submission {} has no staged payload",
                submission.id
            ))
        })?;

        let location = store_payload(self.storage.as_ref(), submission, data).await?;
        let decision = ReviewDecision::Approve {
            location: location.clone(),
        };
        match self.store.finalize_review(submission.id, decision, review).await {
            Ok(published) => Ok(published),
            Err(e) => {
                discard_payload(self.storage.as_ref(), &location).await;
                Err(e)
            }
        }
    }
}
