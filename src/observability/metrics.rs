//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): completed requests by method, status
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency,
//!   including all retries and backoff waits
//! - `proxy_retries_total` (counter): retries by target host

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint listening"),
        Err(err) => tracing::error!(error = %err, "failed to install Prometheus exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

/// Record one scheduled retry.
pub fn record_retry(target: &str) {
    counter!("proxy_retries_total", "target" => target.to_string()).increment(1);
}
