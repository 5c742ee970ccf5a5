//! OpenAPI documentation, served at `/api-docs/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use studyvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudyVault API",
        version = "0.1.0",
        description = "Upload, moderation and browsing of academic documents (question papers, study materials, lab manuals). PDFs are screened by a relevance classifier; anything it is not confident about waits in the moderation queue. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::submissions::create_submission,
        handlers::submissions::get_submission,
        handlers::moderation::list_pending,
        handlers::moderation::decide_submission,
        handlers::resources::list_resources,
        handlers::resources::record_download,
        handlers::admin::get_stats,
        handlers::admin::delete_resource,
    ),
    components(schemas(
        error::ErrorResponse,
        models::IntakeOutcome,
        models::SubmissionResponse,
        models::SubmissionStatus,
        models::Category,
        models::Verdict,
        models::ResourceResponse,
        models::DownloadResponse,
        models::CatalogStats,
        handlers::moderation::DecisionRequest,
        studyvault_core::Decision,
    )),
    modifiers(&ModeratorKeyAddon),
    tags(
        (name = "submissions", description = "Document upload intake"),
        (name = "moderation", description = "Moderation queue for held submissions"),
        (name = "resources", description = "Public catalog of published documents"),
        (name = "admin", description = "Catalog administration"),
    )
)]
pub struct ApiDoc;

/// Bearer scheme for the moderation and admin routes.
struct ModeratorKeyAddon;

impl Modify for ModeratorKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "moderator_key",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("MODERATOR_API_KEY"))
                    .build(),
            ),
        );
    }
}

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
