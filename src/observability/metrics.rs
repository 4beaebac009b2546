//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by backend, status
//! - `proxy_request_duration_seconds` (histogram): latency by backend
//! - `proxy_no_backend_total` (counter): requests refused with 503
//! - `proxy_backend_alive` (gauge): 1=in rotation, 0=tripped (passive health only)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one forwarded request.
pub fn record_request(backend: &str, status: u16, start_time: Instant) {
    let backend = backend.to_string();
    metrics::counter!(
        "proxy_requests_total",
        "backend" => backend.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "backend" => backend)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a request refused because no backend was alive.
pub fn record_no_backend() {
    metrics::counter!("proxy_no_backend_total").increment(1);
}

/// Record a backend entering or leaving rotation.
pub fn record_backend_alive(backend: &str, alive: bool) {
    metrics::gauge!("proxy_backend_alive", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
