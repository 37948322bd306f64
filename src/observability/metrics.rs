//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pagewright_requests_total` (counter): requests by kind and status
//! - `pagewright_request_duration_seconds` (histogram): latency by kind
//! - `pagewright_render_failures_total` (counter): failed renders by stage
//! - `pagewright_module_loads_total` (counter): loads by outcome
//! - `pagewright_module_load_duration_seconds` (histogram): resolution time
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished HTTP request. `kind` is `page`, `data` or `health`.
pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("pagewright_requests_total", "kind" => kind, "status" => status).increment(1);
    histogram!("pagewright_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Record a render that failed. `stage` is `compose`, `prime` or `stream`.
pub fn record_render_failure(stage: &'static str) {
    counter!("pagewright_render_failures_total", "stage" => stage).increment(1);
}

/// Record a module load. `outcome` is `hit`, `resolved` or `failed`.
pub fn record_module_load(outcome: &'static str, start: Instant) {
    counter!("pagewright_module_loads_total", "outcome" => outcome).increment(1);
    if outcome != "hit" {
        histogram!("pagewright_module_load_duration_seconds")
            .record(start.elapsed().as_secs_f64());
    }
}
