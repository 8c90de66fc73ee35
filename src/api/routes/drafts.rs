//! Draft routes: the form builder's editing session.
//!
//! A draft is opened empty or from an owned form, edited one command at a time
//! and finally published (or discarded). Drafts are private to the user who
//! opened them; anyone else gets a 404.

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::builder::{DraftCommand, FormDraft, PublishTarget};
use crate::models::{FieldType, FormField, FormMeta, FormSettings};
use crate::storage::UserContext;

/// Open drafts keyed by draft id.
pub type DraftStore = Arc<Mutex<HashMap<Uuid, DraftSession>>>;

pub fn new_draft_store() -> DraftStore {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Drop drafts untouched for longer than `idle_ttl`. Drafts in the middle of a
/// publish are kept. Returns how many were evicted.
pub async fn evict_idle_drafts(drafts: &DraftStore, idle_ttl: Duration) -> usize {
    let Some(cutoff) = Utc::now().checked_sub_signed(idle_ttl) else {
        return 0;
    };
    let mut drafts = drafts.lock().await;
    let before = drafts.len();
    drafts.retain(|_, session| session.publishing || session.updated_at >= cutoff);
    before - drafts.len()
}

/// A draft together with who is editing it and what it will publish over.
#[derive(Clone, Debug)]
pub struct DraftSession {
    pub id: Uuid,
    pub owner: UserContext,
    /// Set when editing an existing form.
    pub form_id: Option<Uuid>,
    pub draft: FormDraft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while the draft is being handed to the store; edits and a second
    /// publish are refused until it settles.
    pub publishing: bool,
}

impl DraftSession {
    fn publish_target(&self) -> PublishTarget {
        match self.form_id {
            Some(form_id) => PublishTarget::ExistingForm(form_id),
            None => PublishTarget::NewForm(self.owner.clone()),
        }
    }
}

/// Request body for opening a draft
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct OpenDraftRequest {
    /// Existing form to edit; omit for a new form
    #[serde(default)]
    pub form_id: Option<Uuid>,
}

/// Draft state as seen by the builder UI
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DraftView {
    pub draft_id: Uuid,
    pub form_id: Option<Uuid>,
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
    pub meta: FormMeta,
    pub updated_at: DateTime<Utc>,
}

impl From<&DraftSession> for DraftView {
    fn from(session: &DraftSession) -> Self {
        Self {
            draft_id: session.id,
            form_id: session.form_id,
            fields: session.draft.fields().to_vec(),
            settings: session.draft.settings().clone(),
            meta: session.draft.meta().clone(),
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublishResponse {
    pub form_id: Uuid,
    /// False when an existing form was updated
    pub created: bool,
}

/// Entry of the builder's "add field" palette
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FieldTypeInfo {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub has_options: bool,
}

/// Create the drafts router
pub fn drafts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_draft))
        .route("/field-types", get(list_field_types))
        .route("/{draft_id}", get(get_draft).delete(discard_draft))
        .route("/{draft_id}/commands", post(apply_command))
        .route("/{draft_id}/publish", post(publish_draft))
}

/// GET /drafts/field-types - Field types available to the builder
#[utoipa::path(
    get,
    path = "/drafts/field-types",
    tag = "Drafts",
    responses((status = 200, description = "Field palette", body = Vec<FieldTypeInfo>))
)]
pub async fn list_field_types() -> Json<Vec<FieldTypeInfo>> {
    Json(
        FieldType::ALL
            .iter()
            .map(|t| FieldTypeInfo {
                field_type: *t,
                label: t.display_name().to_string(),
                has_options: t.has_options(),
            })
            .collect(),
    )
}

/// POST /drafts - Open a draft, empty or pre-populated from an owned form
#[utoipa::path(
    post,
    path = "/drafts",
    tag = "Drafts",
    request_body = OpenDraftRequest,
    responses(
        (status = 201, description = "Draft opened", body = DraftView),
        (status = 404, description = "Form to edit not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn open_draft(
    State(state): State<AppState>,
    auth: AuthContext,
    request: Option<Json<OpenDraftRequest>>,
) -> Result<(StatusCode, Json<DraftView>), ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let draft = match request.form_id {
        Some(form_id) => {
            let record = super::forms::load_owned_form(&state, &auth, form_id).await?;
            FormDraft::from_record(&record)
        }
        None => FormDraft::new(),
    };

    let now = Utc::now();
    let session = DraftSession {
        id: Uuid::new_v4(),
        owner: auth.user_context.clone(),
        form_id: request.form_id,
        draft,
        created_at: now,
        updated_at: now,
        publishing: false,
    };
    let view = DraftView::from(&session);

    info!(
        "User {} opened draft {} (form: {:?})",
        auth.user_id(),
        session.id,
        session.form_id
    );
    state.drafts.lock().await.insert(session.id, session);

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /drafts/{draft_id} - Current draft state
#[utoipa::path(
    get,
    path = "/drafts/{draft_id}",
    tag = "Drafts",
    params(("draft_id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Draft state", body = DraftView),
        (status = 404, description = "Draft not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_draft(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<DraftView>, ApiError> {
    let drafts = state.drafts.lock().await;
    let session = owned_draft(&drafts, &auth, draft_id)?;
    Ok(Json(DraftView::from(session)))
}

/// POST /drafts/{draft_id}/commands - Apply one builder command
#[utoipa::path(
    post,
    path = "/drafts/{draft_id}/commands",
    tag = "Drafts",
    params(("draft_id" = Uuid, Path, description = "Draft ID")),
    request_body(content = Object, description = "Builder command tagged by `op`"),
    responses(
        (status = 200, description = "Updated draft", body = DraftView),
        (status = 404, description = "Draft not found"),
        (status = 409, description = "Draft is being published"),
        (status = 422, description = "Malformed command")
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply_command(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(draft_id): Path<Uuid>,
    request: Result<Json<DraftCommand>, JsonRejection>,
) -> Result<Json<DraftView>, ApiError> {
    let Json(command) = request?;

    let mut drafts = state.drafts.lock().await;
    let session = drafts
        .get_mut(&draft_id)
        .filter(|s| s.owner.user_id == auth.user_context.user_id)
        .ok_or_else(ApiError::draft_not_found)?;
    if session.publishing {
        return Err(ApiError::draft_publishing());
    }

    session.draft.apply(command);
    session.updated_at = Utc::now();

    Ok(Json(DraftView::from(&*session)))
}

/// POST /drafts/{draft_id}/publish - Persist the draft and close it
///
/// On a store failure the draft stays open and unchanged so the user can retry.
#[utoipa::path(
    post,
    path = "/drafts/{draft_id}/publish",
    tag = "Drafts",
    params(("draft_id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Updated an existing form", body = PublishResponse),
        (status = 201, description = "Created a new form", body = PublishResponse),
        (status = 404, description = "Draft or form not found"),
        (status = 409, description = "Draft is already being published"),
        (status = 503, description = "Form store unavailable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_draft(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(draft_id): Path<Uuid>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    // Publish from a copy so the store call runs without holding the lock.
    // The flag keeps the draft frozen until the store answers.
    let session = {
        let mut drafts = state.drafts.lock().await;
        let session = drafts
            .get_mut(&draft_id)
            .filter(|s| s.owner.user_id == auth.user_context.user_id)
            .ok_or_else(ApiError::draft_not_found)?;
        if session.publishing {
            return Err(ApiError::draft_publishing());
        }
        session.publishing = true;
        session.clone()
    };

    let created = session.form_id.is_none();
    let result = session
        .draft
        .publish(state.store(), &session.publish_target())
        .await;

    let mut drafts = state.drafts.lock().await;
    let form_id = match result {
        Ok(form_id) => {
            drafts.remove(&draft_id);
            form_id
        }
        Err(e) => {
            warn!("Publishing draft {} failed: {}", draft_id, e);
            if let Some(session) = drafts.get_mut(&draft_id) {
                session.publishing = false;
            }
            return Err(ApiError::from(e));
        }
    };
    drop(drafts);
    info!(
        "User {} published draft {} as form {}",
        auth.user_id(),
        draft_id,
        form_id
    );

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(PublishResponse { form_id, created })))
}

/// DELETE /drafts/{draft_id} - Discard without saving
#[utoipa::path(
    delete,
    path = "/drafts/{draft_id}",
    tag = "Drafts",
    params(("draft_id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 204, description = "Draft discarded"),
        (status = 404, description = "Draft not found"),
        (status = 409, description = "Draft is being published")
    ),
    security(("bearer_auth" = []))
)]
pub async fn discard_draft(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(draft_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut drafts = state.drafts.lock().await;
    if owned_draft(&drafts, &auth, draft_id)?.publishing {
        return Err(ApiError::draft_publishing());
    }
    drafts.remove(&draft_id);
    info!("User {} discarded draft {}", auth.user_id(), draft_id);
    Ok(StatusCode::NO_CONTENT)
}

fn owned_draft<'a>(
    drafts: &'a HashMap<Uuid, DraftSession>,
    auth: &AuthContext,
    draft_id: Uuid,
) -> Result<&'a DraftSession, ApiError> {
    drafts
        .get(&draft_id)
        .filter(|s| s.owner.user_id == auth.user_context.user_id)
        .ok_or_else(ApiError::draft_not_found)
}
