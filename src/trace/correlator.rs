//! Trace/span identifier derivation and hop propagation.

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::context::{RequestContext, X_REQUEST_ID};

/// End-to-end correlation id, shared by every hop of one request.
pub const X_TRACE_ID: &str = "x-trace-id";

/// This hop's span id, response-only.
pub const X_SPAN_ID: &str = "x-span-id";

/// On outbound hops: the span that caused the next hop.
pub const X_PARENT_SPAN_ID: &str = "x-parent-span-id";

/// Mint a fresh correlation identifier.
pub fn mint_id() -> String {
    Uuid::new_v4().to_string()
}

/// The trace id supplied by the caller, if any.
pub fn inbound_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_TRACE_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Correlation headers for a call this hop makes to another service.
///
/// Request id and trace id propagate unchanged; the current span id is
/// relabeled as the parent span so the next hop can tell the span that
/// caused it apart from its own.
pub fn propagation_headers(ctx: &RequestContext) -> Vec<(&'static str, String)> {
    let mut headers = vec![(X_REQUEST_ID, ctx.request_id())];
    if let Some(trace_id) = ctx.trace_id() {
        headers.push((X_TRACE_ID, trace_id));
    }
    if let Some(span_id) = ctx.span_id() {
        headers.push((X_PARENT_SPAN_ID, span_id));
    }
    headers
}
