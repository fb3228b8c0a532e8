/// Rate limiting middleware
///
/// Fixed-window rate limiting per authenticated user, backed by the shared
/// Redis handle. Each user gets [`REQUESTS_PER_WINDOW`] requests per
/// [`WINDOW_SECS`] window; the counter lives under `ratelimit:user:{id}`
/// and expires with the window.
///
/// The limiter fails open: a disabled cache or a Redis error admits the
/// request. The cache is advisory everywhere else in this system and rate
/// limiting keeps that contract rather than turning a cache outage into an
/// API outage.
///
/// # Headers
///
/// Successful responses include:
/// - `X-RateLimit-Limit`: requests allowed per window
/// - `X-RateLimit-Remaining`: requests left in the current window
/// - `X-RateLimit-Reset`: Unix timestamp when the window resets
///
/// 429 responses additionally carry `Retry-After` in seconds.

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Extension, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::{SystemTime, UNIX_EPOCH};
use taskboard_shared::auth::middleware::AuthContext;

/// Requests allowed per user per window
pub const REQUESTS_PER_WINDOW: i64 = 60;

/// Window length in seconds
pub const WINDOW_SECS: u64 = 60;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is admitted
    pub ok: bool,

    /// Requests remaining in the current window
    pub remaining: i64,

    /// Seconds until the window resets
    pub reset_after: u64,
}

/// Evaluates a windowed count against the limit
fn evaluate(count: i64, reset_after: u64) -> RateLimitResult {
    RateLimitResult {
        ok: count <= REQUESTS_PER_WINDOW,
        remaining: (REQUESTS_PER_WINDOW - count).max(0),
        reset_after,
    }
}

/// Rate limiting middleware layer
///
/// Runs inside the auth layer, so `AuthContext` is always present.
///
/// # Errors
///
/// 429 Too Many Requests when the user's window is exhausted.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = format!("ratelimit:user:{}", auth.user_id);

    let result = match state.cache.incr_window(&key, WINDOW_SECS).await {
        Some((count, reset_after)) => evaluate(count, reset_after),
        // Fail open when the cache is unavailable
        None => RateLimitResult {
            ok: true,
            remaining: REQUESTS_PER_WINDOW,
            reset_after: WINDOW_SECS,
        },
    };

    if !result.ok {
        tracing::warn!(user_id = %auth.user_id, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: result.reset_after,
            message: format!(
                "Too many requests. Try again in {} seconds",
                result.reset_after
            ),
        });
    }

    let mut response = next.run(request).await;

    let reset_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now.as_secs() + result.reset_after)
        .unwrap_or(0);

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&REQUESTS_PER_WINDOW.to_string()) {
        headers.insert("X-RateLimit-Limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&result.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", value);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_under_limit() {
        let result = evaluate(1, 60);
        assert!(result.ok);
        assert_eq!(result.remaining, 59);

        let result = evaluate(REQUESTS_PER_WINDOW, 10);
        assert!(result.ok);
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn test_evaluate_over_limit() {
        let result = evaluate(REQUESTS_PER_WINDOW + 1, 30);
        assert!(!result.ok);
        assert_eq!(result.remaining, 0);
        assert_eq!(result.reset_after, 30);
    }
}
