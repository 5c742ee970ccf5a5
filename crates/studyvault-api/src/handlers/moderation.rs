//! Moderation queue endpoints.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use studyvault_core::models::{SubmissionResponse, DEFAULT_LISTING_LIMIT};
use studyvault_core::{AppError, Decision, Review};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const MAX_NOTE_LENGTH: usize = 2000;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PendingQuery {
    /// Page size (1-200, default 50)
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub decision: Decision,
    /// Reason shown to the submitter; kept on rejection
    pub note: Option<String>,
    pub reviewer: Option<String>,
    /// Must be `true` to reject; rejection deletes the staged file
    #[serde(default)]
    pub confirm: bool,
}

impl DecisionRequest {
    fn into_review(self) -> Result<(Decision, Review), AppError> {
        if self.decision == Decision::Reject && !self.confirm {
            return Err(AppError::BadRequest(
                "Rejection is irreversible; resend with \"confirm\": true".to_string(),
            ));
        }
        let note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if note.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTE_LENGTH) {
            return Err(AppError::InvalidInput(format!(
                "note must be at most {} characters",
                MAX_NOTE_LENGTH
            )));
        }
        let reviewer = self
            .reviewer
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Ok((self.decision, Review { note, reviewer }))
    }
}

#[utoipa::path(
    get,
    path = "/api/v0/moderation/pending",
    tag = "moderation",
    security(("moderator_key" = [])),
    params(PendingQuery),
    responses(
        (status = 200, description = "Held submissions, newest first", body = Vec<SubmissionResponse>),
        (status = 401, description = "Missing or invalid moderator API key", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, HttpAppError> {
    let pending = state
        .moderation
        .list_pending(
            query.limit.unwrap_or(DEFAULT_LISTING_LIMIT),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(pending.into_iter().map(SubmissionResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v0/moderation/{id}/decision",
    tag = "moderation",
    security(("moderator_key" = [])),
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision applied", body = SubmissionResponse),
        (status = 401, description = "Missing or invalid moderator API key", body = ErrorResponse),
        (status = 400, description = "Missing confirmation or invalid body", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
        (status = 409, description = "Submission is not pending review", body = ErrorResponse),
        (status = 502, description = "Durable storage write failed; nothing changed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "decide_submission", submission_id = %id))]
pub async fn decide_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<DecisionRequest>,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let (decision, review) = request.into_review()?;
    let submission = state.moderation.decide(id, decision, review).await?;
    Ok(Json(SubmissionResponse::from(submission)))
}
