//! Metrics collection and exposition.
//!
//! # Metrics
//! - `request_filter_decisions_total` (counter): verdicts by outcome and reason
//! - `request_filter_reloads_total` (counter): rule reloads by result
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record an allowed request.
pub fn record_allowed() {
    counter!("request_filter_decisions_total", "outcome" => "allowed", "reason" => "none")
        .increment(1);
}

/// Record a rejected request.
pub fn record_rejected(reason: &'static str) {
    counter!("request_filter_decisions_total", "outcome" => "rejected", "reason" => reason)
        .increment(1);
}

/// Record a rule reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("request_filter_reloads_total", "result" => result).increment(1);
}
