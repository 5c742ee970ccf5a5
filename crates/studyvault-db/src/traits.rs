//! Submission store abstraction
//!
//! The services only talk to this trait, so the intake pipeline and the
//! moderation queue can be exercised without a database.

use async_trait::async_trait;
use bytes::Bytes;
use studyvault_core::models::{
    CatalogStats, ListingQuery, NewSubmission, StorageLocation, Submission, SubmissionStatus,
    Verdict,
};
use studyvault_core::{AppError, Review, ReviewDecision, Transition};
use uuid::Uuid;

/// Durable record of submissions and their lifecycle.
///
/// Every status change is a single atomic, guarded write: it succeeds only if
/// the stored status is one the transition allows, otherwise it fails with
/// `AppError::InvalidStateTransition` and nothing is modified. Unknown ids fail
/// with `AppError::NotFound`.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission in status `intake` with its bytes staged inline.
    async fn create(&self, new: NewSubmission) -> Result<Submission, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError>;

    /// Staged bytes of an `intake` or `pending_review` submission.
    async fn inline_payload(&self, id: Uuid) -> Result<Option<Bytes>, AppError>;

    /// Newest first.
    async fn list_by_status(
        &self,
        status: SubmissionStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, AppError>;

    /// Apply a guarded lifecycle transition.
    async fn transition(&self, id: Uuid, transition: Transition) -> Result<Submission, AppError>;

    /// Published submissions matching the query, newest first.
    async fn search_published(&self, query: &ListingQuery) -> Result<Vec<Submission>, AppError>;

    /// Bump the download counter of a published submission.
    /// `None` if the id is unknown or not published.
    async fn increment_downloads(&self, id: Uuid) -> Result<Option<Submission>, AppError>;

    /// Remove a published submission's record. Returns it so the caller can
    /// delete the stored object.
    async fn delete_published(&self, id: Uuid) -> Result<Option<Submission>, AppError>;

    async fn stats(&self) -> Result<CatalogStats, AppError>;

    /// `intake → pending_review`, recording the verdict if there is one.
    async fn hold_for_review(
        &self,
        id: Uuid,
        verdict: Option<Verdict>,
    ) -> Result<Submission, AppError> {
        self.transition(id, Transition::HoldForReview { verdict })
            .await
    }

    /// `intake | pending_review → published`, atomically swapping the inline
    /// payload for the durable reference.
    async fn promote_to_published(
        &self,
        id: Uuid,
        verdict: Option<Verdict>,
        location: StorageLocation,
    ) -> Result<Submission, AppError> {
        self.transition(id, Transition::Publish { verdict, location })
            .await
    }

    /// `pending_review → published | rejected`. Rejection purges the payload.
    async fn finalize_review(
        &self,
        id: Uuid,
        decision: ReviewDecision,
        review: Review,
    ) -> Result<Submission, AppError> {
        self.transition(id, decision.into_transition(review)).await
    }
}
