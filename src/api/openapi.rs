//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Authentication
        crate::routes::auth::me,
        crate::routes::auth::refresh,
        crate::routes::auth::logout,
        // Drafts
        crate::routes::drafts::list_field_types,
        crate::routes::drafts::open_draft,
        crate::routes::drafts::get_draft,
        crate::routes::drafts::apply_command,
        crate::routes::drafts::publish_draft,
        crate::routes::drafts::discard_draft,
        // Forms
        crate::routes::forms::list_forms,
        crate::routes::forms::get_form,
        crate::routes::forms::delete_form,
        // Responses
        crate::routes::forms::list_responses,
        crate::routes::forms::export_responses,
        // Public
        crate::routes::public::get_public_form,
        crate::routes::public::submit_response,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::FieldType,
        crate::models::FormField,
        crate::models::FormSettings,
        crate::models::FormMeta,
        crate::models::FormSnapshot,
        crate::models::FormRecord,
        crate::models::FormUpdate,
        crate::models::FormSummary,
        crate::models::PublicForm,
        crate::models::Answer,
        crate::models::FormResponse,
        crate::models::SubmittedAnswer,
        crate::models::SubmissionRequest,
        crate::routes::auth::MeResponse,
        crate::routes::auth::RefreshRequest,
        crate::routes::drafts::OpenDraftRequest,
        crate::routes::drafts::DraftView,
        crate::routes::drafts::PublishResponse,
        crate::routes::drafts::FieldTypeInfo,
        crate::routes::public::SubmissionResponse,
        crate::services::TokenPair,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Session inspection, refresh and logout"),
        (name = "Drafts", description = "Form builder drafts and commands"),
        (name = "Forms", description = "Published forms owned by the caller"),
        (name = "Responses", description = "Submissions and CSV export"),
        (name = "Public", description = "Respondent-facing form access and submission"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Form Builder API",
        description = "REST API for building, publishing and collecting responses to forms",
        version = "1.0.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Keep the document version in step with Cargo.toml
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
        openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new)
            .add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
    }
}
