use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_submission_form;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studyvault_core::models::{IntakeOutcome, SubmissionResponse};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/submissions",
    tag = "submissions",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: file, title, subject, description (optional), department, category, submitter"),
    responses(
        (status = 201, description = "Submission accepted and routed", body = IntakeOutcome),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_submission"))]
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IntakeOutcome>), HttpAppError> {
    let new = extract_submission_form(multipart).await?;
    let outcome = state.intake.submit(new).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/v0/submissions/{id}",
    tag = "submissions",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Current submission status", body = SubmissionResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let submission = state.intake.status(id).await?;
    Ok(Json(SubmissionResponse::from(submission)))
}
