//! Shared HTTP surface.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → TraceLayer (access logging span)
//!     → context middleware (request id, task-local scope)
//!     → trace middleware (trace inherit-or-mint, own span)
//!     → metrics middleware (request counter, latency histogram)
//!     → timeout / body limit / CORS
//!     → service router (handlers return Envelope or AppError)
//! ```
//!
//! # Design Decisions
//! - One layer stack shared by the gateway and both services so correlation
//!   and envelope behavior cannot drift between binaries
//! - Extractor rejections are converted to `AppError` before they can render
//!   a non-envelope body
//! - Route and method misses answer through the same fallback, so axum's
//!   bare 404/405 defaults never reach a client

pub mod envelope;
pub mod extract;
pub mod health;

pub use envelope::{Envelope, ErrorDetail, ErrorEnvelope};
pub use extract::{AppJson, AppQuery};
pub use health::health;

use std::time::Duration;

use axum::{http::HeaderName, middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::PlatformConfig,
    context::{request_context_middleware, X_REQUEST_ID},
    error::AppError,
    observability::metrics::track_requests,
    trace::{trace_correlation_middleware, X_TRACE_ID},
};

/// Answer for paths and methods the router does not define.
///
/// Axum's defaults render empty non-envelope bodies there; a route miss is
/// a failure like any other and speaks the envelope.
async fn route_fallback() -> AppError {
    AppError::not_found("Route not found")
}

/// Wrap a service router in the platform layer stack.
///
/// `service` labels the metrics series. Layers added later wrap the earlier
/// ones, so the trace layer ends up outermost and sees every request before
/// any platform code runs.
pub fn platform_layers(
    router: Router,
    service: &'static str,
    config: &PlatformConfig,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(X_REQUEST_ID),
            HeaderName::from_static(X_TRACE_ID),
        ]);

    router
        .fallback(route_fallback)
        .method_not_allowed_fallback(route_fallback)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(middleware::from_fn_with_state(service, track_requests))
        .layer(middleware::from_fn(trace_correlation_middleware))
        .layer(middleware::from_fn(request_context_middleware))
        .layer(TraceLayer::new_for_http())
}
