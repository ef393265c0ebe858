//! Metrics collection and exposition.
//!
//! # Metrics
//! - `verify_requests_total` (counter): requests by method, route, status
//! - `verify_request_duration_seconds` (histogram): latency by method, route
//! - `verify_lookups_total` (counter): lookups by outcome (hit/miss)
//! - `verify_records_added_total` (counter)
//! - `verify_rate_limited_total` (counter): requests rejected with 429
//! - `verify_rate_limiter_clients` (gauge): tracked client IPs
//! - `verify_rate_limiter_evictions_total` (counter): idle buckets swept

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Middleware recording request count and latency per matched route.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    record_request(&method, &route, response.status().as_u16(), start);
    response
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "verify_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "verify_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    metrics::counter!("verify_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_verification_added() {
    metrics::counter!("verify_records_added_total").increment(1);
}

pub fn record_rate_limited() {
    metrics::counter!("verify_rate_limited_total").increment(1);
}

pub fn record_limiter_sweep(evicted: usize, remaining: usize) {
    metrics::counter!("verify_rate_limiter_evictions_total").increment(evicted as u64);
    metrics::gauge!("verify_rate_limiter_clients").set(remaining as f64);
}
