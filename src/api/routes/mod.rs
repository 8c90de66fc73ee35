//! API routes module - organizes all route handlers.
//!
//! Owner-facing routes require a bearer token; `/public` is open to respondents.

pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod drafts;
pub mod error;
pub mod forms;
pub mod openapi;
pub mod public;

use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use app_state::AppState;
pub use error::ApiError;

/// Create the API router combining all route modules (mounted under /api/v1)
pub fn create_api_router(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth::auth_router())
        .nest("/drafts", drafts::drafts_router())
        .nest("/forms", forms::forms_router())
        .nest("/public", public::public_router(app_state))
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
}

/// Build the full application: health checks, the API under /api/v1, state and tracing.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_api_router(&app_state))
        .with_state(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "form-builder-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
