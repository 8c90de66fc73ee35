//! Authentication routes.
//!
//! Users sign in with the external identity provider, which issues the first
//! token pair. This router lets clients inspect the current identity, refresh
//! tokens and log out.
//!
//! Security features:
//! - Time-scoped JWT access tokens (15 minutes)
//! - Refresh tokens for session renewal (7 days)
//! - Session revocation on logout

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::services::jwt_service::TokenPair;

/// Revoked sessions (for logout before token expiry), keyed by session id.
///
/// Each entry lives until the last token the session could hold has expired.
pub type RevokedSessions = Arc<Mutex<HashMap<String, DateTime<Utc>>>>;

pub fn new_revoked_sessions() -> RevokedSessions {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Revoke `session_id` until `until`.
pub async fn revoke_session(revoked: &RevokedSessions, session_id: &str, until: DateTime<Utc>) {
    revoked.lock().await.insert(session_id.to_string(), until);
}

pub async fn is_session_revoked(revoked: &RevokedSessions, session_id: &str) -> bool {
    revoked
        .lock()
        .await
        .get(session_id)
        .is_some_and(|until| *until > Utc::now())
}

/// Forget revocations whose tokens have all expired. Returns how many were dropped.
pub async fn prune_revoked_sessions(revoked: &RevokedSessions) -> usize {
    let now = Utc::now();
    let mut revoked = revoked.lock().await;
    let before = revoked.len();
    revoked.retain(|_, until| *until > now);
    before - revoked.len()
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Create the auth router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// GET /auth/me - Current identity
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(auth: AuthContext) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.user_context.user_id,
        email: auth.user_context.email,
        session_id: auth.session_id,
    })
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Invalid, expired or revoked refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    request: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(request) = request?;
    let (claims, pair) = state
        .jwt
        .refresh_access_token(&request.refresh_token)
        .map_err(|e| {
            warn!("Refresh token rejected: {}", e);
            ApiError::unauthorized(e)
        })?;

    if is_session_revoked(&state.revoked_sessions, &claims.session_id).await {
        warn!("Refresh attempted for revoked session {}", claims.session_id);
        return Err(ApiError::unauthorized("Session has been revoked"));
    }

    Ok(Json(pair))
}

/// POST /auth/logout - Revoke the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> StatusCode {
    // Any token of this session was issued before now, so none outlives a refresh lifetime from now.
    let until = Utc::now() + state.jwt.refresh_token_duration();
    revoke_session(&state.revoked_sessions, &auth.session_id, until).await;

    // Open drafts are discarded on logout.
    let mut drafts = state.drafts.lock().await;
    let before = drafts.len();
    drafts.retain(|_, draft| draft.owner.user_id != auth.user_context.user_id);
    let discarded = before - drafts.len();

    info!(
        "User {} logged out (session: {}), discarded {} draft(s)",
        auth.user_context.user_id, auth.session_id, discarded
    );
    StatusCode::NO_CONTENT
}
