//! Prometheus recorder and the discovery metrics

use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

use super::config::MetricsConfig;

/// Route label used for requests no route matched, keeping label cardinality bounded
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Handle to the installed recorder; renders the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: PrometheusHandle,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global recorder. `None` when disabled or already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        info!("Prometheus metrics disabled");
        return None;
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .inspect_err(|e| error!(error = %e, "Failed to install Prometheus recorder"))
        .ok()?;

    gauge!("qeats_discovery_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    info!(path = %config.path, "Prometheus metrics enabled");

    Some(PrometheusMetrics { handle })
}

/// Router serving the exposition at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(|State(metrics): State<PrometheusMetrics>| async move { metrics.render() }))
        .with_state(metrics)
}

/// One served request; `route` is the route template, never the raw path
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_owned()),
        ("route", route.to_owned()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Outcome of a spatial cache read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
    Error,
}

impl CacheLookup {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheLookup::Hit => "hit",
            CacheLookup::Miss => "miss",
            CacheLookup::Error => "error",
        }
    }
}

pub fn record_cache_lookup(result: CacheLookup) {
    counter!("restaurant_cache_lookups_total", "result" => result.as_str()).increment(1);
}

/// Latency of a discovery request by kind (`nearby` or `search`)
pub fn record_search(kind: &'static str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "error" };

    histogram!("restaurant_search_duration_seconds", "kind" => kind, "status" => status)
        .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lookup_labels() {
        assert_eq!(CacheLookup::Hit.as_str(), "hit");
        assert_eq!(CacheLookup::Miss.as_str(), "miss");
        assert_eq!(CacheLookup::Error.as_str(), "error");
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_cache_lookup(CacheLookup::Miss);
        record_search("nearby", true, Duration::from_millis(5));
        record_http_request("GET", UNMATCHED_ROUTE, 404, Duration::from_millis(1));
    }
}
