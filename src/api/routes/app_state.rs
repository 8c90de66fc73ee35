//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state: the
//! form store, open drafts, revoked sessions, the JWT service and the public
//! submission rate limiter.

use super::auth::{RevokedSessions, new_revoked_sessions, prune_revoked_sessions};
use super::drafts::{DraftStore, evict_idle_drafts, new_draft_store};
use crate::config::{ServerConfig, StorageConfig};
use crate::middleware::{RateLimiterState, create_rate_limiter};
use crate::services::jwt_service::{JwtService, SharedJwtService};
use crate::storage::{FileFormStore, FormStore, MemoryFormStore, PostgresFormStore, StorageError};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// Idle time after which an untouched draft is discarded, unless configured.
const DEFAULT_DRAFT_IDLE_TTL_SECS: i64 = 86_400;
/// Longer settings are clamped to ten years.
const MAX_DRAFT_IDLE_TTL_SECS: u64 = 10 * 365 * 86_400;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store holding published forms and responses
    pub store: Arc<dyn FormStore>,
    /// Drafts currently being edited
    pub drafts: DraftStore,
    /// Sessions that logged out before their tokens expired
    pub revoked_sessions: RevokedSessions,
    /// Token issuing and validation
    pub jwt: SharedJwtService,
    /// Throttle for public submissions
    pub submit_limiter: RateLimiterState,
    /// Drafts idle for longer than this are evicted
    pub draft_idle_ttl: Duration,
}

impl AppState {
    /// Create a state around an existing store.
    pub fn new(store: Arc<dyn FormStore>, jwt: JwtService) -> Self {
        Self {
            store,
            drafts: new_draft_store(),
            revoked_sessions: new_revoked_sessions(),
            jwt: Arc::new(jwt),
            submit_limiter: create_rate_limiter(100),
            draft_idle_ttl: Duration::seconds(DEFAULT_DRAFT_IDLE_TTL_SECS),
        }
    }

    /// In-memory state, as used by tests and local runs.
    pub fn in_memory(jwt: JwtService) -> Self {
        Self::new(Arc::new(MemoryFormStore::new()), jwt)
    }

    pub fn with_submit_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.submit_limiter = create_rate_limiter(requests_per_minute);
        self
    }

    pub fn with_draft_idle_ttl(mut self, ttl: Duration) -> Self {
        self.draft_idle_ttl = ttl;
        self
    }

    /// Build the state described by `config`, connecting to the configured store.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn FormStore> = match &config.storage {
            StorageConfig::Memory => {
                info!("Using in-memory form store");
                Arc::new(MemoryFormStore::new())
            }
            StorageConfig::File(dir) => {
                info!("Using file form store at {:?}", dir);
                Arc::new(FileFormStore::open(dir.clone()).await?)
            }
            StorageConfig::Postgres(url) => {
                info!("Using PostgreSQL form store");
                Arc::new(PostgresFormStore::connect(url).await?)
            }
        };

        let draft_idle_ttl_secs = config.draft_idle_ttl_secs.min(MAX_DRAFT_IDLE_TTL_SECS) as i64;
        let draft_idle_ttl = Duration::seconds(draft_idle_ttl_secs);

        Ok(Self::new(store, JwtService::new(&config.jwt_secret))
            .with_submit_rate_limit(config.public_submit_rate_limit)
            .with_draft_idle_ttl(draft_idle_ttl))
    }

    /// Get a reference to the form store.
    pub fn store(&self) -> &dyn FormStore {
        self.store.as_ref()
    }

    /// Evict idle drafts and forget expired revocations.
    /// Returns `(drafts evicted, revocations pruned)`.
    pub async fn prune_expired(&self) -> (usize, usize) {
        let drafts = evict_idle_drafts(&self.drafts, self.draft_idle_ttl).await;
        let revocations = prune_revoked_sessions(&self.revoked_sessions).await;
        (drafts, revocations)
    }
}

/// Start background task to prune idle drafts and expired session revocations
pub async fn start_session_cleanup_task(state: AppState, every: std::time::Duration) {
    // A zero period would make tokio::time::interval panic.
    let mut interval = tokio::time::interval(every.max(std::time::Duration::from_secs(1)));

    loop {
        interval.tick().await;

        let (drafts, revocations) = state.prune_expired().await;
        if drafts > 0 || revocations > 0 {
            info!(
                "Cleanup evicted {} idle draft(s) and {} expired revocation(s)",
                drafts, revocations
            );
        } else {
            debug!("Cleanup found nothing to prune");
        }
    }
}
