//! Form routes for the owner's dashboard: list, inspect, delete, responses and CSV export.

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{FormRecord, FormResponse, FormSummary};
use crate::services::ExportService;

/// Create the forms router
pub fn forms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_forms))
        .route("/{form_id}", get(get_form).delete(delete_form))
        .route("/{form_id}/responses", get(list_responses))
        .route("/{form_id}/responses/export", get(export_responses))
}

/// Load a form the caller owns. Forms owned by someone else are reported as missing.
pub(crate) async fn load_owned_form(
    state: &AppState,
    auth: &AuthContext,
    form_id: Uuid,
) -> Result<FormRecord, ApiError> {
    match state.store().get_form(form_id).await? {
        Some(record) if record.created_by == auth.user_context.user_id => Ok(record),
        Some(_) => {
            warn!(
                "User {} attempted to access form {} they do not own",
                auth.user_id(),
                form_id
            );
            Err(ApiError::form_not_found())
        }
        None => Err(ApiError::form_not_found()),
    }
}

/// GET /forms - Forms created by the caller, newest first
#[utoipa::path(
    get,
    path = "/forms",
    tag = "Forms",
    responses((status = 200, description = "Caller's forms", body = Vec<FormSummary>)),
    security(("bearer_auth" = []))
)]
pub async fn list_forms(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<FormSummary>>, ApiError> {
    let records = state
        .store()
        .list_forms_by_owner(&auth.user_context.user_id)
        .await?;
    Ok(Json(records.iter().map(FormSummary::from).collect()))
}

/// GET /forms/{form_id} - Full form record
#[utoipa::path(
    get,
    path = "/forms/{form_id}",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form", body = FormRecord),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormRecord>, ApiError> {
    Ok(Json(load_owned_form(&state, &auth, form_id).await?))
}

/// DELETE /forms/{form_id} - Delete a form and its responses
#[utoipa::path(
    delete,
    path = "/forms/{form_id}",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 204, description = "Form deleted"),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_form(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    load_owned_form(&state, &auth, form_id).await?;
    state.store().delete_form(form_id).await?;
    info!("User {} deleted form {}", auth.user_id(), form_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /forms/{form_id}/responses - Submissions, oldest first
#[utoipa::path(
    get,
    path = "/forms/{form_id}/responses",
    tag = "Responses",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Responses", body = Vec<FormResponse>),
        (status = 404, description = "Form not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_responses(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Vec<FormResponse>>, ApiError> {
    load_owned_form(&state, &auth, form_id).await?;
    Ok(Json(state.store().list_responses(form_id).await?))
}

/// GET /forms/{form_id}/responses/export - Responses as a CSV download
#[utoipa::path(
    get,
    path = "/forms/{form_id}/responses/export",
    tag = "Responses",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv"),
        (status = 404, description = "Form not found or no responses")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_responses(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(form_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let form = load_owned_form(&state, &auth, form_id).await?;
    let responses = state.store().list_responses(form_id).await?;
    let export = ExportService::export_csv(&form, &responses)?;

    info!(
        "Exported {} response(s) of form {} as {}",
        responses.len(),
        form_id,
        export.filename
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    )
        .into_response())
}
