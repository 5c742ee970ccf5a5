//! In-memory `SubmissionStore` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use studyvault_core::models::{
    CatalogStats, ListingQuery, NewSubmission, Submission, SubmissionStatus,
};
use studyvault_core::{AppError, Transition};
use uuid::Uuid;

use crate::traits::SubmissionStore;

type Records = HashMap<Uuid, (Submission, Option<Bytes>)>;

/// Mutex-guarded map with the same guarded-transition semantics as the
/// Postgres repository. `set_fail_transitions` simulates a database outage
/// for status changes.
#[derive(Clone, Default)]
pub struct InMemorySubmissionStore {
    records: Arc<Mutex<Records>>,
    fail_transitions: Arc<AtomicBool>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_transitions(&self, fail: bool) {
        self.fail_transitions.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, AppError> {
        self.records
            .lock()
            .map_err(|_| AppError::Internal("submission store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn create(&self, new: NewSubmission) -> Result<Submission, AppError> {
        let submission = Submission::from_new(&new, Utc::now());
        self.lock()?
            .insert(submission.id, (submission.clone(), Some(new.data)));
        Ok(submission)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        Ok(self.lock()?.get(&id).map(|(s, _)| s.clone()))
    }

    async fn inline_payload(&self, id: Uuid) -> Result<Option<Bytes>, AppError> {
        Ok(self.lock()?.get(&id).and_then(|(_, data)| data.clone()))
    }

    async fn list_by_status(
        &self,
        status: SubmissionStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, AppError> {
        let mut matching: Vec<Submission> = self
            .lock()?
            .values()
            .filter(|(s, _)| s.status == status)
            .map(|(s, _)| s.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(matching, limit, offset))
    }

    async fn transition(&self, id: Uuid, transition: Transition) -> Result<Submission, AppError> {
        if self.fail_transitions.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "simulated database failure".to_string(),
            ));
        }

        let mut records = self.lock()?;
        let (submission, data) = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))?;

        let target = transition.target();
        submission.apply(transition, Utc::now())?;
        if target != SubmissionStatus::PendingReview {
            *data = None;
        }
        Ok(submission.clone())
    }

    async fn search_published(&self, query: &ListingQuery) -> Result<Vec<Submission>, AppError> {
        let mut matching: Vec<Submission> = self
            .lock()?
            .values()
            .filter(|(s, _)| query.matches(s))
            .map(|(s, _)| s.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(matching, query.limit, query.offset))
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let mut records = self.lock()?;
        Ok(records.get_mut(&id).and_then(|(s, _)| {
            if s.status == SubmissionStatus::Published {
                s.download_count += 1;
                Some(s.clone())
            } else {
                None
            }
        }))
    }

    async fn delete_published(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let mut records = self.lock()?;
        let published = records
            .get(&id)
            .is_some_and(|(s, _)| s.status == SubmissionStatus::Published);
        if !published {
            return Ok(None);
        }
        Ok(records.remove(&id).map(|(s, _)| s))
    }

    async fn stats(&self) -> Result<CatalogStats, AppError> {
        let records = self.lock()?;
        let week_ago = Utc::now() - Duration::days(7);

        let published: Vec<&Submission> = records
            .values()
            .map(|(s, _)| s)
            .filter(|s| s.status == SubmissionStatus::Published)
            .collect();
        let mut submitters: Vec<&str> = published.iter().map(|s| s.submitter.as_str()).collect();
        submitters.sort_unstable();
        submitters.dedup();

        Ok(CatalogStats {
            total_published: published.len() as i64,
            total_downloads: published.iter().map(|s| s.download_count).sum(),
            unique_submitters: submitters.len() as i64,
            published_last_7_days: published
                .iter()
                .filter(|s| s.created_at > week_ago)
                .count() as i64,
            pending_review: records
                .values()
                .filter(|(s, _)| s.status == SubmissionStatus::PendingReview)
                .count() as i64,
        })
    }
}

fn page(items: Vec<Submission>, limit: i64, offset: i64) -> Vec<Submission> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}
