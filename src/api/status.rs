//! Status Routes
//!
//! Health checks for load balancers and orchestration.
//!
//! Routes:
//! - GET /health - Basic health check
//! - GET /health/ready - Readiness check (dependencies probed)
//! - GET /health/live - Liveness check (server responding)

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Build status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<DependencyCheck>,
}

#[derive(Debug, Serialize)]
pub struct DependencyCheck {
    pub name: String,
    pub status: HealthStatus,
    pub latency_ms: Option<u64>,
    pub message: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Basic health check.
///
/// GET /health
///
/// Returns 200 if the server is running. Used by load balancers
/// for basic availability checking.
#[axum::debug_handler]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
    })
}

/// Readiness check.
///
/// GET /health/ready
///
/// Probes the database and the cache. Returns 503 only when the database
/// is down; browsing works without the cache, so a dead cache reports
/// degraded but keeps the service ready.
#[axum::debug_handler]
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = Vec::new();

    let db_check = check_database(&state).await;
    let ready = db_check.status == HealthStatus::Healthy;
    checks.push(db_check);

    checks.push(check_cache(&state).await);

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}

/// Liveness check.
///
/// GET /health/live
///
/// Simple check that the server is responding.
#[axum::debug_handler]
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check database connectivity.
async fn check_database(state: &AppState) -> DependencyCheck {
    let start = Instant::now();

    let result = sqlx::query_as::<_, (i64,)>("SELECT 1")
        .fetch_one(&state.db)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let (status, message) = match result {
        Ok(_) => (HealthStatus::Healthy, None),
        Err(e) => (
            HealthStatus::Unhealthy,
            Some(format!("Database error: {}", e)),
        ),
    };

    DependencyCheck {
        name: "database".into(),
        status,
        latency_ms: Some(latency_ms),
        message,
    }
}

/// Check cache connectivity.
async fn check_cache(state: &AppState) -> DependencyCheck {
    let start = Instant::now();

    let result = state.cache.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(()) => (HealthStatus::Healthy, None),
        Err(e) => (HealthStatus::Degraded, Some(format!("Cache error: {}", e))),
    };

    DependencyCheck {
        name: "cache".into(),
        status,
        latency_ms: Some(latency_ms),
        message,
    }
}
