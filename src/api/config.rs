//! Server configuration read from the environment at startup.

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-do-not-use-in-production-change-me-now";
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable is required in production")]
    MissingJwtSecret,
    #[error("JWT_SECRET must be at least 32 characters in production")]
    WeakJwtSecret,
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which backend holds published forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    File(PathBuf),
    Postgres(String),
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub is_development: bool,
    pub jwt_secret: String,
    pub storage: StorageConfig,
    pub public_submit_rate_limit: u32,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
    /// Drafts untouched for this long are discarded.
    pub draft_idle_ttl_secs: u64,
    /// How often idle drafts and expired revocations are pruned.
    pub cleanup_interval_secs: u64,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// Outside `APP_ENV=development` a missing or short `JWT_SECRET` is an error;
    /// in development an insecure default is used with a warning.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());
        let is_development = app_env.to_lowercase() == "development";

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(s) => s,
            Err(_) if is_development => {
                warn!(
                    "JWT_SECRET not set! Using default secret for development. DO NOT USE IN PRODUCTION!"
                );
                DEV_JWT_SECRET.to_string()
            }
            Err(_) => return Err(ConfigError::MissingJwtSecret),
        };

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            if is_development {
                warn!("JWT_SECRET is less than 32 characters. Consider using a longer secret.");
            } else {
                return Err(ConfigError::WeakJwtSecret);
            }
        }

        let storage = if let Ok(url) = env::var("DATABASE_URL") {
            StorageConfig::Postgres(url)
        } else if let Ok(dir) = env::var("FORMS_DATA_DIR") {
            StorageConfig::File(PathBuf::from(dir))
        } else {
            StorageConfig::Memory
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port: parse_var("PORT", 8081)?,
            is_development,
            jwt_secret,
            storage,
            public_submit_rate_limit: parse_var("PUBLIC_SUBMIT_RATE_LIMIT", 100)?,
            cors_allowed_origins,
            draft_idle_ttl_secs: parse_var("DRAFT_IDLE_TTL_SECS", 86_400)?,
            cleanup_interval_secs: parse_var("CLEANUP_INTERVAL_SECS", 300)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}
