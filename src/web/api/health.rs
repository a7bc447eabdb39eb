//! Health Check API
//!
//! Liveness and readiness for load balancers, plus a summary endpoint.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::time::Instant;
use tracing::warn;

use super::AppState;
use crate::cache::CacheStats;

/// Process metadata for health reporting
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    pub version: &'static str,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// Timestamp (ISO 8601)
    pub timestamp: String,
    pub content_cache: CacheStats,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.health.version,
        uptime_secs: state.health.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        content_cache: state.content.cache_stats(),
    })
}

/// Liveness check
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness check: the content root must still be reachable
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match tokio::fs::metadata(state.files.root()).await {
        Ok(meta) if meta.is_dir() => StatusCode::OK,
        _ => {
            warn!(root = %state.files.root().display(), "Content root unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
