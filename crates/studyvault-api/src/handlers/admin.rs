use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studyvault_core::models::CatalogStats;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/admin/stats",
    tag = "admin",
    security(("moderator_key" = [])),
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats),
        (status = 401, description = "Missing or invalid moderator API key", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogStats>, HttpAppError> {
    Ok(Json(state.catalog.stats().await?))
}

#[utoipa::path(
    delete,
    path = "/api/v0/admin/resources/{id}",
    tag = "admin",
    security(("moderator_key" = [])),
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 204, description = "Resource and stored file removed"),
        (status = 401, description = "Missing or invalid moderator API key", body = ErrorResponse),
        (status = 404, description = "No published resource with this ID", body = ErrorResponse)
    )
)]
pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.catalog.delete_resource(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
