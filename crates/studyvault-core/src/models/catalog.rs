//! Public listing and admin statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::submission::{Category, Submission, SubmissionStatus};

pub const DEFAULT_LISTING_LIMIT: i64 = 50;
pub const MAX_LISTING_LIMIT: i64 = 200;

/// Filter for the published listing. Search is a case-insensitive substring match.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub limit: i64,
    pub offset: i64,
}

impl ListingQuery {
    pub fn new(search: Option<String>, category: Option<Category>) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            search,
            category,
            limit: DEFAULT_LISTING_LIMIT,
            offset: 0,
        }
    }

    pub fn paginate(mut self, limit: Option<i64>, offset: Option<i64>) -> Self {
        self.limit = limit
            .unwrap_or(DEFAULT_LISTING_LIMIT)
            .clamp(1, MAX_LISTING_LIMIT);
        self.offset = offset.unwrap_or(0).max(0);
        self
    }

    /// Whether a submission belongs in this listing.
    pub fn matches(&self, submission: &Submission) -> bool {
        if submission.status != SubmissionStatus::Published {
            return false;
        }
        if let Some(category) = self.category {
            if submission.category != category {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(submission.title.as_str()),
                    Some(submission.subject.as_str()),
                    Some(submission.department.as_str()),
                    submission.description.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

/// A published resource as shown to the public.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceResponse {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub department: String,
    pub category: Category,
    pub uploaded_by: String,
    pub file_name: String,
    pub file_size: i64,
    pub url: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

impl ResourceResponse {
    /// `None` for anything that is not published.
    pub fn from_submission(s: Submission) -> Option<Self> {
        let url = s.public_url()?.to_string();
        Some(ResourceResponse {
            id: s.id,
            title: s.title,
            subject: s.subject,
            description: s.description,
            department: s.department,
            category: s.category,
            uploaded_by: s.submitter,
            file_name: s.file_name,
            file_size: s.declared_size,
            url,
            download_count: s.download_count,
            created_at: s.created_at,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogStats {
    pub total_published: i64,
    pub total_downloads: i64,
    pub unique_submitters: i64,
    pub published_last_7_days: i64,
    pub pending_review: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadResponse {
    pub id: Uuid,
    pub url: String,
    pub download_count: i64,
}
