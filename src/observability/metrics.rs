//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by service, method, status
//! - `http_request_duration_seconds` (histogram): latency by the same labels
//! - `gateway_upstream_errors_total` (counter): failed relays by route
//!
//! # Design Decisions
//! - One shared middleware records both series so the counter and histogram
//!   can never disagree on labels
//! - Metric macros are no-ops until an exporter is installed, so services
//!   run unchanged with metrics disabled

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape endpoint.
///
/// Failure to bind is logged and the process keeps running without
/// exposition; metrics are not worth refusing to serve traffic over.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(error) => tracing::error!(%error, "Failed to install metrics exporter"),
    }
}

/// Record the request counter and latency histogram for one request.
///
/// Runs inside the correlation layers so panics and timeouts further out are
/// not counted; everything that reached platform code is.
pub async fn track_requests(
    State(service): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "service" => service,
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "service" => service,
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Count a relay attempt that never produced an upstream response.
pub fn record_upstream_error(route: &str, reason: &'static str) {
    counter!(
        "gateway_upstream_errors_total",
        "route" => route.to_string(),
        "reason" => reason
    )
    .increment(1);
}
