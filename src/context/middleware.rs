//! Context middleware.
//!
//! Runs outermost-but-one (inside request logging): reads or mints the
//! request id, begins the context, and binds it around the rest of the
//! stack so every layer and handler below sees `RequestContext::current()`.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

use super::store::RequestContext;

/// Per-request correlation id header, inbound and outbound.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Begin the request context and echo `x-request-id` on the response.
///
/// An inbound id is adopted verbatim; otherwise a fresh UUID v4 is minted,
/// so two concurrent requests can never share an id.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let ctx = RequestContext::begin(request_id.clone());
    let mut response = ctx.scope(next.run(request)).await;

    if !response.headers().contains_key(X_REQUEST_ID) {
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
    }
    response
}
