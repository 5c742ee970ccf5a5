//! Route configuration and setup

use crate::api_doc;
use crate::auth::{moderator_auth_middleware, ModeratorAuth};
use crate::constants::{API_PREFIX, OPENAPI_JSON_PATH};
use crate::handlers;
use crate::state::{AppState, HttpConfig};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa_rapidoc::RapiDoc;

/// Build the full router: versioned API, file serving, health and docs.
pub fn setup_routes(state: Arc<AppState>) -> Router {
    let cors = setup_cors(&state.http);
    tracing::info!(
        concurrency_limit = state.http.concurrency_limit,
        max_body_bytes = state.http.max_body_bytes,
        "HTTP limits configured"
    );

    let moderator_auth = Arc::new(ModeratorAuth::new(state.http.moderator_api_key.as_str()));

    let moderator_routes = Router::new()
        .route("/moderation/pending", get(handlers::moderation::list_pending))
        .route(
            "/moderation/{id}/decision",
            post(handlers::moderation::decide_submission),
        )
        .route("/admin/stats", get(handlers::admin::get_stats))
        .route(
            "/admin/resources/{id}",
            delete(handlers::admin::delete_resource),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            moderator_auth,
            moderator_auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/submissions", post(handlers::submissions::create_submission))
        .route("/submissions/{id}", get(handlers::submissions::get_submission))
        .route("/resources", get(handlers::resources::list_resources))
        .route(
            "/resources/{id}/download",
            post(handlers::resources::record_download),
        )
        .merge(moderator_routes);

    Router::new()
        .nest(API_PREFIX, api_routes)
        .route("/files/{*key}", get(handlers::files::get_file))
        .route("/health", get(handlers::health::health_check))
        .merge(RapiDoc::with_openapi(OPENAPI_JSON_PATH, api_doc::openapi()).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(state.http.concurrency_limit))
        .layer(RequestBodyLimitLayer::new(state.http.max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn setup_cors(http: &HttpConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    if http.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = http
            .cors_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    }
}
