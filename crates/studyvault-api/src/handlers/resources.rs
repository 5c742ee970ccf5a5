//! Public catalog of published resources.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use studyvault_core::models::{Category, DownloadResponse, ListingQuery, ResourceResponse};
use studyvault_core::AppError;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResourceQuery {
    /// Case-insensitive match on title, subject, department or description
    pub search: Option<String>,
    /// `question-paper`, `study-material`, `lab-manual` or `all`
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) if c.eq_ignore_ascii_case("all") => Ok(None),
        Some(c) => c
            .parse()
            .map(Some)
            .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/api/v0/resources",
    tag = "resources",
    params(ResourceQuery),
    responses(
        (status = 200, description = "Published resources, newest first", body = Vec<ResourceResponse>),
        (status = 400, description = "Invalid category", body = ErrorResponse)
    )
)]
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<ResourceResponse>>, HttpAppError> {
    let category = parse_category(query.category.as_deref())?;
    let listing = ListingQuery::new(query.search, category).paginate(query.limit, query.offset);
    let resources = state.catalog.search(&listing).await?;
    Ok(Json(resources))
}

#[utoipa::path(
    post,
    path = "/api/v0/resources/{id}/download",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Download counted", body = DownloadResponse),
        (status = 404, description = "No published resource with this ID", body = ErrorResponse)
    )
)]
pub async fn record_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadResponse>, HttpAppError> {
    let download = state.catalog.record_download(id).await?;
    Ok(Json(download))
}
