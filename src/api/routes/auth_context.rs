//! Authentication context utilities.
//!
//! Provides the extractor that turns a bearer token into the calling user.

use super::app_state::AppState;
use super::auth::is_session_revoked;
use super::error::ApiError;
use crate::storage::traits::UserContext;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_context: UserContext,
    pub session_id: String,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.user_context.user_id
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                tracing::warn!("No authorization token provided");
                ApiError::unauthorized("Missing bearer token")
            })?;

        let claims = state.jwt.validate_access_token(bearer.token()).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ApiError::unauthorized(e)
        })?;

        if claims.sub.is_empty() {
            tracing::warn!("JWT has empty subject claim");
            return Err(ApiError::unauthorized("Token has no subject"));
        }

        if is_session_revoked(&state.revoked_sessions, &claims.session_id).await {
            tracing::warn!("Session {} has been revoked", claims.session_id);
            return Err(ApiError::unauthorized("Session has been revoked"));
        }

        Ok(AuthContext {
            user_context: claims.user_context(),
            session_id: claims.session_id,
        })
    }
}
