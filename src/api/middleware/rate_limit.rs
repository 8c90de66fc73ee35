//! Rate limiting middleware.
//!
//! Public submission endpoints are open to anyone holding a form link, so they
//! are throttled with a process-wide governor quota.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter state
pub type RateLimiterState = Arc<
    RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(100).unwrap();

/// Create a rate limiter allowing `requests_per_minute` (0 falls back to 100).
pub fn create_rate_limiter(requests_per_minute: u32) -> RateLimiterState {
    let quota = Quota::per_minute(
        NonZeroU32::new(requests_per_minute).unwrap_or(DEFAULT_REQUESTS_PER_MINUTE),
    );
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded for request: {}", request.uri());
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}
