//! Trace correlation middleware.
//!
//! Sits just inside the context layer. Stamps the hop's trace/span pair into
//! the context on the way in and onto the response on the way out.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crate::context::RequestContext;

use super::correlator::{inbound_trace_id, mint_id, X_SPAN_ID, X_TRACE_ID};

pub async fn trace_correlation_middleware(request: Request, next: Next) -> Response {
    let trace_id = inbound_trace_id(request.headers()).unwrap_or_else(mint_id);
    let span_id = mint_id();

    if let Some(ctx) = RequestContext::current() {
        ctx.stamp_trace(trace_id.clone(), span_id.clone());
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // The gateway's relay rule may already have chosen the client-facing
    // trace id; only fill it in when nothing downstream did.
    if !headers.contains_key(X_TRACE_ID) {
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            headers.insert(X_TRACE_ID, value);
        }
    }
    // The span id is always this hop's own.
    if let Ok(value) = HeaderValue::from_str(&span_id) {
        headers.insert(X_SPAN_ID, value);
    }

    response
}
