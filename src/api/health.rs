//! Health endpoints: `/health`, `/ready`, `/live`

use std::future::Future;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            Self::Healthy | Self::Degraded => StatusCode::OK,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ComponentHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Debug)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl ComponentHealth {
    /// Times `check`; a failed check reports `on_failure`
    async fn check<F>(name: &'static str, on_failure: HealthStatus, check: F) -> Self
    where
        F: Future<Output = Result<(), String>>,
    {
        let started = Instant::now();
        let outcome = check.await;

        Self {
            name,
            status: if outcome.is_ok() { HealthStatus::Healthy } else { on_failure },
            message: outcome.err(),
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Process is up and serving
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: VERSION,
        checks: Vec::new(),
        latency_ms: None,
    })
}

/// Store and cache reachability.
///
/// The store is required: without it the instance is unhealthy (503). The cache
/// is optional: lookups fall back to the store, so an unreachable cache only
/// degrades the instance.
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();

    let mut checks = vec![
        ComponentHealth::check("restaurant_store", HealthStatus::Unhealthy, async {
            state.repository.ping().await.map_err(|e| e.to_string())
        })
        .await,
    ];

    if let Some(cache) = &state.cache {
        checks.push(
            ComponentHealth::check("cache", HealthStatus::Degraded, async {
                if cache.is_available().await {
                    Ok(())
                } else {
                    Err("cache unreachable, serving from store".to_string())
                }
            })
            .await,
        );
    }

    let status = checks
        .iter()
        .map(|check| check.status)
        .max()
        .unwrap_or(HealthStatus::Healthy);

    let response = HealthResponse {
        status,
        version: VERSION,
        checks,
        latency_ms: Some(started.elapsed().as_millis() as u64),
    };

    (status.status_code(), Json(response))
}

pub async fn live_check() -> StatusCode {
    StatusCode::OK
}
