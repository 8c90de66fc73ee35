//! JWT Service for token generation and validation.
//!
//! Users authenticate with the external identity provider; this service issues
//! and checks the time-scoped tokens the API accepts afterwards.
//! - Access tokens: Short-lived (15 minutes) for API requests
//! - Refresh tokens: Longer-lived (7 days) for obtaining new access tokens

use crate::storage::UserContext;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity provider user id)
    pub sub: String,
    /// User email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token type: "access" or "refresh"
    pub token_type: TokenType,
    /// Session ID (for tracking/revocation)
    pub session_id: String,
}

impl Claims {
    pub fn user_context(&self) -> UserContext {
        UserContext {
            user_id: self.sub.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Token pair returned after authentication
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: i64,
    pub refresh_token_expires_at: i64,
    pub token_type: String,
}

/// JWT Service configuration
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    ///
    /// # Arguments
    /// * `secret` - The secret key for signing tokens (should be at least 32 bytes)
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_duration: Duration::minutes(15),
            refresh_token_duration: Duration::days(7),
        }
    }

    /// Override the access token lifetime.
    pub fn with_access_token_duration(mut self, duration: Duration) -> Self {
        self.access_token_duration = duration;
        self
    }

    /// Lifetime of refresh tokens, the longest any token of a session can live.
    pub fn refresh_token_duration(&self) -> Duration {
        self.refresh_token_duration
    }

    /// Generate a token pair (access + refresh) for a user
    pub fn generate_token_pair(
        &self,
        user: &UserContext,
        session_id: &str,
    ) -> Result<TokenPair, String> {
        let now = Utc::now();

        // Access token
        let access_exp = now + self.access_token_duration;
        let access_claims = Claims {
            sub: user.user_id.clone(),
            email: user.email.clone(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
            token_type: TokenType::Access,
            session_id: session_id.to_string(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|e| format!("Failed to encode access token: {}", e))?;

        // Refresh token
        let refresh_exp = now + self.refresh_token_duration;
        let refresh_claims = Claims {
            exp: refresh_exp.timestamp(),
            token_type: TokenType::Refresh,
            ..access_claims
        };

        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|e| format!("Failed to encode refresh token: {}", e))?;

        info!(
            "Generated token pair for user {} (session: {}), access expires: {}, refresh expires: {}",
            user.user_id, session_id, access_exp, refresh_exp
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expires_at: access_exp.timestamp(),
            refresh_token_expires_at: refresh_exp.timestamp(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Validate an access token and return the claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, String> {
        let token_data = self.decode_token(token)?;

        if token_data.claims.token_type != TokenType::Access {
            return Err("Invalid token type: expected access token".to_string());
        }

        Ok(token_data.claims)
    }

    /// Validate a refresh token and return the claims
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, String> {
        let token_data = self.decode_token(token)?;

        if token_data.claims.token_type != TokenType::Refresh {
            return Err("Invalid token type: expected refresh token".to_string());
        }

        Ok(token_data.claims)
    }

    /// Decode and validate a token (checks signature and expiration)
    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>, String> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidToken => "Invalid token format".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                "Invalid token signature".to_string()
            }
            _ => format!("Token validation failed: {}", e),
        })
    }

    /// Generate a new token pair from a valid refresh token, keeping the session
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<(Claims, TokenPair), String> {
        let claims = self.validate_refresh_token(refresh_token)?;
        let pair = self.generate_token_pair(&claims.user_context(), &claims.session_id)?;
        Ok((claims, pair))
    }
}

/// Shared JWT service for use across the application
pub type SharedJwtService = Arc<JwtService>;
