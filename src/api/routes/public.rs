//! Public routes used by respondents following a shared form link.

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::app_state::AppState;
use super::error::ApiError;
use crate::middleware::rate_limit_middleware;
use crate::models::{PublicForm, SubmissionRequest};
use crate::services::SubmissionService;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub response_id: Uuid,
}

/// Create the public router. Submissions go through the rate limiter.
pub fn public_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/forms/{form_id}", get(get_public_form))
        .route(
            "/forms/{form_id}/responses",
            post(submit_response).route_layer(middleware::from_fn_with_state(
                state.submit_limiter.clone(),
                rate_limit_middleware,
            )),
        )
}

/// GET /public/forms/{form_id} - Form as shown to respondents
#[utoipa::path(
    get,
    path = "/public/forms/{form_id}",
    tag = "Public",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form", body = PublicForm),
        (status = 404, description = "Form not found")
    )
)]
pub async fn get_public_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<PublicForm>, ApiError> {
    let record = state
        .store()
        .get_form(form_id)
        .await?
        .ok_or_else(ApiError::form_not_found)?;
    Ok(Json(PublicForm::from(record)))
}

/// POST /public/forms/{form_id}/responses - Submit answers
#[utoipa::path(
    post,
    path = "/public/forms/{form_id}/responses",
    tag = "Public",
    params(("form_id" = Uuid, Path, description = "Form ID")),
    request_body = SubmissionRequest,
    responses(
        (status = 201, description = "Submission stored", body = SubmissionResponse),
        (status = 404, description = "Form not found"),
        (status = 422, description = "Submission rejected or malformed"),
        (status = 429, description = "Too many submissions")
    )
)]
pub async fn submit_response(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    request: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let Json(request) = request?;
    let form = state
        .store()
        .get_form(form_id)
        .await?
        .ok_or_else(ApiError::form_not_found)?;

    let answers = SubmissionService::prepare_answers(&form, request.answers).map_err(|e| {
        warn!("Rejected submission for form {}: {}", form_id, e);
        ApiError::from(e)
    })?;

    let response = state.store().save_response(form_id, answers).await?;
    info!("Stored response {} for form {}", response.id, form_id);

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            response_id: response.id,
        }),
    ))
}
