/// Health check endpoint
///
/// Reports connectivity of both backing services. The store is required;
/// the cache is required only when configured (a deliberately disabled
/// cache does not degrade health).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "timestamp": "2026-01-01T00:00:00Z",
///   "uptime": 4711,
///   "services": {
///     "database": "connected",
///     "redis": "connected"
///   }
/// }
/// ```
///
/// Returns 503 with `"status": "error"` when a required dependency is down.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "error"
    pub status: String,

    /// When the check ran
    pub timestamp: DateTime<Utc>,

    /// Seconds since process start
    pub uptime: u64,

    /// Per-dependency connectivity
    pub services: ServiceStatus,
}

/// Connectivity of the backing services
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// "connected" or "disconnected"
    pub database: String,

    /// "connected", "disconnected", or "disabled"
    pub redis: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = pool::health_check(&state.db).await.is_ok();

    let (redis_status, redis_healthy) = if !state.cache.is_enabled() {
        ("disabled", true)
    } else if state.cache.ping().await {
        ("connected", true)
    } else {
        ("disconnected", false)
    };

    let healthy = database_up && redis_healthy;

    let response = HealthResponse {
        status: if healthy { "ok" } else { "error" }.to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs(),
        services: ServiceStatus {
            database: if database_up {
                "connected"
            } else {
                "disconnected"
            }
            .to_string(),
            redis: redis_status.to_string(),
        },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
