//! Serves stored objects by key. Public URLs of the local backend point here.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use std::sync::Arc;
use studyvault_core::AppError;
use studyvault_processing::DocumentKind;

fn content_type_for(key: &str) -> &'static str {
    key.rsplit_once('.')
        .and_then(|(_, ext)| DocumentKind::from_extension(ext))
        .map(|kind| kind.content_type())
        .unwrap_or("application/octet-stream")
}

fn content_disposition(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    format!("inline; filename*=UTF-8''{}", urlencoding::encode(name))
}

#[tracing::instrument(skip(state), fields(operation = "get_file"))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let stream = state.storage.download_stream(&key).await?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&key))
        .header(header::CONTENT_DISPOSITION, content_disposition(&key))
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
