//! Prometheus metrics for the clip search service.
//!
//! Exposes an HTTP endpoint for Prometheus scraping.

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::ServiceError;

/// Initialize the metrics system and return the Prometheus handle.
pub fn init_metrics() -> Result<PrometheusHandle, ServiceError> {
    // Register metric descriptions
    describe_histogram!(
        "search_latency_ms",
        "Time taken for a single prompt search in milliseconds"
    );
    describe_counter!("search_queries_total", "Total number of prompt searches issued");
    describe_counter!(
        "search_query_errors_total",
        "Total number of prompt searches that failed"
    );
    describe_counter!(
        "video_url_lookups_total",
        "Total number of video stream URL lookups"
    );
    describe_counter!(
        "video_url_lookup_errors_total",
        "Total number of failed or empty video stream URL lookups"
    );
    describe_counter!("keepalive_pings_total", "Total number of keep-alive pings sent");
    describe_counter!(
        "keepalive_ping_errors_total",
        "Total number of keep-alive pings that failed"
    );

    // Build Prometheus exporter
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServiceError::Internal(format!("Failed to install Prometheus recorder: {}", e)))
}

/// Record a search latency measurement.
pub fn record_search_latency(latency_ms: f64) {
    histogram!("search_latency_ms").record(latency_ms);
}

/// Increment the search count.
pub fn increment_search_count() {
    counter!("search_queries_total").increment(1);
}

/// Increment the search error count.
pub fn increment_search_errors() {
    counter!("search_query_errors_total").increment(1);
}

pub fn increment_url_lookups() {
    counter!("video_url_lookups_total").increment(1);
}

pub fn increment_url_lookup_errors() {
    counter!("video_url_lookup_errors_total").increment(1);
}

pub fn increment_keepalive_pings() {
    counter!("keepalive_pings_total").increment(1);
}

pub fn increment_keepalive_errors() {
    counter!("keepalive_ping_errors_total").increment(1);
}

/// Create an Axum router for the metrics HTTP endpoint.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}

/// Start the metrics HTTP server on the given port with auto-detect binding.
pub async fn start_metrics_server(port: u16, handle: PrometheusHandle) -> Result<(), ServiceError> {
    let app = metrics_router(handle);

    // Auto-detect: Try dual-stack first, fall back to IPv4-only
    let listener = match tokio::net::TcpListener::bind(("::", port)).await {
        Ok(listener) => {
            info!(port = port, bind = "::", "Starting metrics server (dual-stack)");
            listener
        }
        Err(_) => {
            info!(port = port, bind = "0.0.0.0", "Starting metrics server (IPv4-only fallback)");
            tokio::net::TcpListener::bind(("0.0.0.0", port))
                .await
                .map_err(|e| ServiceError::Internal(format!("Failed to bind metrics server: {}", e)))?
        }
    };

    axum::serve(listener, app)
        .await
        .map_err(|e| ServiceError::Internal(format!("Metrics server failed: {}", e)))
}
