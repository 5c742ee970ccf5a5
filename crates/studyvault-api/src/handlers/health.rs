//! Liveness plus a database ping.

use crate::constants::API_VERSION;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    api_version: &'static str,
    database: String,
    storage: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match &state.pool {
        None => "not_configured".to_string(),
        Some(pool) => {
            match tokio::time::timeout(DB_PING_TIMEOUT, sqlx::query("SELECT 1").execute(pool))
                .await
            {
                Ok(Ok(_)) => "healthy".to_string(),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Database health check failed");
                    format!("unhealthy: {}", e)
                }
                Err(_) => {
                    tracing::error!("Database health check timed out");
                    "timeout".to_string()
                }
            }
        }
    };

    let healthy = database == "healthy" || database == "not_configured";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            api_version: API_VERSION,
            database,
            storage: state.storage.backend_type().to_string(),
        }),
    )
}
