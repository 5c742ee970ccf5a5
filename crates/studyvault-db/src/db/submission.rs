//! Submission repository: CRUD and guarded transitions for the submissions table.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use studyvault_core::models::{
    CatalogStats, Category, ListingQuery, NewSubmission, Payload, StorageLocation, Submission,
    SubmissionStatus, Verdict,
};
use studyvault_core::{AppError, StorageBackend, Transition};
use uuid::Uuid;

use crate::traits::SubmissionStore;

/// Every column except the inline bytes, which are only read by `inline_payload`.
const SUBMISSION_COLUMNS: &str = r#"
    id, title, subject, description, department, category, submitter, submitter_id,
    file_name, content_type, declared_size, status,
    octet_length(inline_data)::BIGINT AS inline_size,
    storage_backend, storage_bucket, storage_key, storage_url,
    verdict, review_note, reviewed_by, reviewed_at, download_count, created_at, updated_at
"#;

/// Row type for the submissions table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct SubmissionRow {
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
    pub inline_size: Option<i64>,
    pub storage_backend: Option<StorageBackend>,
    pub storage_bucket: Option<String>,
    pub storage_key: Option<String>,
    pub storage_url: Option<String>,
    pub verdict: Option<Json<Verdict>>,
    pub review_note: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionRow {
    pub fn to_submission(self) -> Result<Submission, AppError> {
        let payload = match self.status {
            SubmissionStatus::Intake | SubmissionStatus::PendingReview => Payload::Inline {
                size_bytes: self.inline_size.unwrap_or(self.declared_size),
            },
            SubmissionStatus::Published => {
                match (self.storage_backend, self.storage_key, self.storage_url) {
                    (Some(backend), Some(key), Some(url)) => Payload::Stored(StorageLocation {
                        backend,
                        bucket: self.storage_bucket,
                        key,
                        url,
                    }),
                    _ => {
                        return Err(AppError::Internal(format!(
                            "Published submission {} has no storage location",
                            self.id
                        )))
                    }
                }
            }
            SubmissionStatus::Rejected => Payload::Purged,
        };

        Ok(Submission {
            id: self.id,
            title: self.title,
            subject: self.subject,
            description: self.description,
            department: self.department,
            category: self.category,
            submitter: self.submitter,
            submitter_id: self.submitter_id,
            file_name: self.file_name,
            content_type: self.content_type,
            declared_size: self.declared_size,
            status: self.status,
            payload,
            verdict: self.verdict.map(|v| v.0),
            review_note: self.review_note,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            download_count: self.download_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_published: i64,
    total_downloads: i64,
    unique_submitters: i64,
    published_last_7_days: i64,
    pending_review: i64,
}

/// Escape `%`, `_` and `\` so a user search term matches literally inside ILIKE.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn status_names(statuses: &[SubmissionStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Postgres implementation of `SubmissionStore`.
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Explain why a guarded update matched no row.
    async fn transition_failure(&self, id: Uuid, to: SubmissionStatus) -> AppError {
        let current: Result<Option<SubmissionStatus>, sqlx::Error> =
            sqlx::query_scalar::<Postgres, SubmissionStatus>(
                "SELECT status FROM submissions WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        match current {
            Ok(Some(from)) => AppError::InvalidStateTransition { from, to },
            Ok(None) => AppError::NotFound(format!("Submission {} not found", id)),
            Err(e) => AppError::Database(e),
        }
    }
}

#[async_trait]
impl SubmissionStore for SubmissionRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "submissions", size_bytes = new.data.len()))]
    async fn create(&self, new: NewSubmission) -> Result<Submission, AppError> {
        let sql = format!(
            r#"
            INSERT INTO submissions (
                id, title, subject, description, department, category, submitter,
                submitter_id, file_name, content_type, declared_size, status, inline_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'intake', $12)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let row: SubmissionRow = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.subject)
            .bind(&new.description)
            .bind(&new.department)
            .bind(new.category)
            .bind(&new.submitter)
            .bind(&new.submitter_id)
            .bind(&new.file_name)
            .bind(&new.content_type)
            .bind(new.data.len() as i64)
            .bind(new.data.as_ref())
            .fetch_one(&self.pool)
            .await?;

        row.to_submission()
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let sql = format!("SELECT {} FROM submissions WHERE id = $1", SUBMISSION_COLUMNS);
        let row: Option<SubmissionRow> = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SubmissionRow::to_submission).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.record_id = %id))]
    async fn inline_payload(&self, id: Uuid) -> Result<Option<Bytes>, AppError> {
        let data: Option<Option<Vec<u8>>> = sqlx::query_scalar::<Postgres, Option<Vec<u8>>>(
            "SELECT inline_data FROM submissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data.flatten().map(Bytes::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", status = %status))]
    async fn list_by_status(
        &self,
        status: SubmissionStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM submissions
            WHERE status = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            SUBMISSION_COLUMNS
        );

        let rows: Vec<SubmissionRow> = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SubmissionRow::to_submission).collect()
    }

    #[tracing::instrument(
        skip(self, transition),
        fields(db.table = "submissions", db.record_id = %id, to = %transition.target())
    )]
    async fn transition(&self, id: Uuid, transition: Transition) -> Result<Submission, AppError> {
        let target = transition.target();
        let allowed = status_names(transition.allowed_from());

        let row: Option<SubmissionRow> = match transition {
            Transition::HoldForReview { verdict } => {
                let sql = format!(
                    r#"
                    UPDATE submissions
                    SET status = $3, verdict = COALESCE(verdict, $4), updated_at = NOW()
                    WHERE id = $1 AND status::text = ANY($2)
                    RETURNING {}
                    "#,
                    SUBMISSION_COLUMNS
                );
                sqlx::query_as::<Postgres, SubmissionRow>(&sql)
                    .bind(id)
                    .bind(&allowed)
                    .bind(target)
                    .bind(verdict.map(Json))
                    .fetch_optional(&self.pool)
                    .await?
            }
            Transition::Publish { verdict, location } => {
                let sql = format!(
                    r#"
                    UPDATE submissions
                    SET status = $3, verdict = COALESCE(verdict, $4), inline_data = NULL,
                        storage_backend = $5, storage_bucket = $6, storage_key = $7,
                        storage_url = $8, updated_at = NOW()
                    WHERE id = $1 AND status::text = ANY($2)
                    RETURNING {}
                    "#,
                    SUBMISSION_COLUMNS
                );
                sqlx::query_as::<Postgres, SubmissionRow>(&sql)
                    .bind(id)
                    .bind(&allowed)
                    .bind(target)
                    .bind(verdict.map(Json))
                    .bind(location.backend)
                    .bind(&location.bucket)
                    .bind(&location.key)
                    .bind(&location.url)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Transition::Approve { location, review } => {
                let sql = format!(
                    r#"
                    UPDATE submissions
                    SET status = $3, inline_data = NULL,
                        storage_backend = $4, storage_bucket = $5, storage_key = $6,
                        storage_url = $7, review_note = $8, reviewed_by = $9,
                        reviewed_at = NOW(), updated_at = NOW()
                    WHERE id = $1 AND status::text = ANY($2)
                    RETURNING {}
                    "#,
                    SUBMISSION_COLUMNS
                );
                sqlx::query_as::<Postgres, SubmissionRow>(&sql)
                    .bind(id)
                    .bind(&allowed)
                    .bind(target)
                    .bind(location.backend)
                    .bind(&location.bucket)
                    .bind(&location.key)
                    .bind(&location.url)
                    .bind(&review.note)
                    .bind(&review.reviewer)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Transition::Reject { review } => {
                let sql = format!(
                    r#"
                    UPDATE submissions
                    SET status = $3, inline_data = NULL, review_note = $4, reviewed_by = $5,
                        reviewed_at = NOW(), updated_at = NOW()
                    WHERE id = $1 AND status::text = ANY($2)
                    RETURNING {}
                    "#,
                    SUBMISSION_COLUMNS
                );
                sqlx::query_as::<Postgres, SubmissionRow>(&sql)
                    .bind(id)
                    .bind(&allowed)
                    .bind(target)
                    .bind(&review.note)
                    .bind(&review.reviewer)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        match row {
            Some(row) => row.to_submission(),
            None => Err(self.transition_failure(id, target).await),
        }
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "submissions"))]
    async fn search_published(&self, query: &ListingQuery) -> Result<Vec<Submission>, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM submissions
            WHERE status = 'published'
              AND ($1::TEXT IS NULL
                   OR title ILIKE $1 OR subject ILIKE $1
                   OR department ILIKE $1 OR description ILIKE $1)
              AND ($2::submission_category IS NULL OR category = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
            SUBMISSION_COLUMNS
        );

        let rows: Vec<SubmissionRow> = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
            .bind(query.search.as_deref().map(like_pattern))
            .bind(query.category)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SubmissionRow::to_submission).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.record_id = %id))]
    async fn increment_downloads(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let sql = format!(
            r#"
            UPDATE submissions
            SET download_count = download_count + 1
            WHERE id = $1 AND status = 'published'
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let row: Option<SubmissionRow> = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SubmissionRow::to_submission).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.record_id = %id))]
    async fn delete_published(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let sql = format!(
            "DELETE FROM submissions WHERE id = $1 AND status = 'published' RETURNING {}",
            SUBMISSION_COLUMNS
        );

        let row: Option<SubmissionRow> = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SubmissionRow::to_submission).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions"))]
    async fn stats(&self) -> Result<CatalogStats, AppError> {
        let row: StatsRow = sqlx::query_as::<Postgres, StatsRow>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'published') AS total_published,
                COALESCE(SUM(download_count) FILTER (WHERE status = 'published'), 0)::BIGINT
                    AS total_downloads,
                COUNT(DISTINCT submitter) FILTER (WHERE status = 'published') AS unique_submitters,
                COUNT(*) FILTER (
                    WHERE status = 'published' AND created_at > NOW() - INTERVAL '7 days'
                ) AS published_last_7_days,
                COUNT(*) FILTER (WHERE status = 'pending_review') AS pending_review
            FROM submissions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogStats {
            total_published: row.total_published,
            total_downloads: row.total_downloads,
            unique_submitters: row.unique_submitters,
            published_last_7_days: row.published_last_7_days,
            pending_review: row.pending_review,
        })
    }
}
