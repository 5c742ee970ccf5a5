use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::storage::StorageLocation;
use super::verdict::Verdict;

/// Lifecycle status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "submission_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Intake,
    PendingReview,
    Published,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Intake => "intake",
            SubmissionStatus::PendingReview => "pending_review",
            SubmissionStatus::Published => "published",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Published | SubmissionStatus::Rejected
        )
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "intake" => Ok(SubmissionStatus::Intake),
            "pending_review" => Ok(SubmissionStatus::PendingReview),
            "published" | "approved" => Ok(SubmissionStatus::Published),
            "rejected" => Ok(SubmissionStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid submission status: {}", s)),
        }
    }
}

/// Kind of academic document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "submission_category", rename_all = "snake_case")
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[serde(alias = "question-papers")]
    QuestionPaper,
    #[serde(alias = "study-materials")]
    StudyMaterial,
    #[serde(alias = "lab-manuals")]
    LabManual,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::QuestionPaper => "question-paper",
            Category::StudyMaterial => "study-material",
            Category::LabManual => "lab-manual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::QuestionPaper => "Question Paper",
            Category::StudyMaterial => "Study Material",
            Category::LabManual => "Lab Manual",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "question-paper" | "question-papers" => Ok(Category::QuestionPaper),
            "study-material" | "study-materials" => Ok(Category::StudyMaterial),
            "lab-manual" | "lab-manuals" => Ok(Category::LabManual),
            _ => Err(anyhow::anyhow!(
                "Invalid category: {}. Must be question-paper, study-material or lab-manual",
                s
            )),
        }
    }
}

/// Where a submission's bytes currently are.
///
/// Inline bytes are staged with the record and fetched on demand through the
/// repository; the record only carries their size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "location", rename_all = "snake_case")]
pub enum Payload {
    Inline { size_bytes: i64 },
    Stored(StorageLocation),
    Purged,
}

impl Payload {
    pub fn storage_location(&self) -> Option<&StorageLocation> {
        match self {
            Payload::Stored(location) => Some(location),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Payload::Inline { .. })
    }
}

/// A unit of work moving through intake and moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub department: String,
    pub category: Category,
    pub submitter: String,
    pub submitter_id: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub declared_size: i64,
    pub status: SubmissionStatus,
    pub payload: Payload,
    pub verdict: Option<Verdict>,
    pub review_note: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Build the record `create` persists: status `intake`, payload inline.
    pub fn from_new(new: &NewSubmission, now: DateTime<Utc>) -> Self {
        Submission {
            id: Uuid::new_v4(),
            title: new.title.clone(),
            subject: new.subject.clone(),
            description: new.description.clone(),
            department: new.department.clone(),
            category: new.category,
            submitter: new.submitter.clone(),
            submitter_id: new.submitter_id.clone(),
            file_name: new.file_name.clone(),
            content_type: new.content_type.clone(),
            declared_size: new.data.len() as i64,
            status: SubmissionStatus::Intake,
            payload: Payload::Inline {
                size_bytes: new.data.len() as i64,
            },
            verdict: None,
            review_note: None,
            reviewed_by: None,
            reviewed_at: None,
            download_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn public_url(&self) -> Option<&str> {
        self.payload.storage_location().map(|l| l.url.as_str())
    }

    pub fn file_extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Intake fields plus the staged bytes.
#[derive(Debug, Clone, Validate)]
pub struct NewSubmission {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "subject must be 1-200 characters"))]
    pub subject: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub department: String,
    pub category: Category,
    #[validate(length(min = 1, max = 120, message = "submitter name is required"))]
    pub submitter: String,
    pub submitter_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Result of an intake request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntakeOutcome {
    pub id: Uuid,
    pub status: SubmissionStatus,
    /// Absent when the document was not classified or classification failed.
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub department: String,
    pub category: Category,
    pub submitter: String,
    pub file_name: String,
    pub file_size: i64,
    pub status: SubmissionStatus,
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        let url = s.public_url().map(str::to_string);
        SubmissionResponse {
            id: s.id,
            title: s.title,
            subject: s.subject,
            description: s.description,
            department: s.department,
            category: s.category,
            submitter: s.submitter,
            file_name: s.file_name,
            file_size: s.declared_size,
            status: s.status,
            verdict: s.verdict,
            url,
            review_note: s.review_note,
            reviewed_by: s.reviewed_by,
            reviewed_at: s.reviewed_at,
            download_count: s.download_count,
            created_at: s.created_at,
        }
    }
}
