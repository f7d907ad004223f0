//! Upstream relay.
//!
//! Builds the outbound request from an explicit header whitelist, forwards
//! it, and hands the upstream response back with this hop's correlation
//! headers restored. Nothing from the inbound request is forwarded
//! implicitly.

use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::{
    context::RequestContext,
    error::AppError,
    observability::metrics::record_upstream_error,
    trace::{propagation_headers, X_SPAN_ID},
};

use super::rules::RouteRule;

pub type HttpClient = Client<HttpConnector, Body>;

/// Shared connection-pooling client for upstream hops.
pub fn build_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Entity headers copied from the inbound request; the relayed body is
/// useless to the upstream without them.
const ENTITY_HEADERS: [header::HeaderName; 2] = [header::CONTENT_TYPE, header::ACCEPT];

/// Connection-scoped headers that must not survive the hop.
const HOP_BY_HOP: [&str; 5] = [
    "connection",
    "keep-alive",
    "transfer-encoding",
    "te",
    "upgrade",
];

/// Relay `request` to the rule's upstream.
///
/// Ordinary upstream responses, success or application error, pass through
/// with status and body unchanged. Connectivity failures and upstream
/// timeouts surface as `bad_gateway` so they are never mistaken for an
/// application error.
///
/// If the client disconnects mid-hop, this future is dropped and the
/// upstream call is abandoned with it; cancellation of the upstream request
/// is best-effort, not guaranteed.
pub async fn relay(
    client: &HttpClient,
    rule: &RouteRule,
    request: Request,
    upstream_timeout: Duration,
    forward_authorization: bool,
) -> Result<Response<Body>, AppError> {
    let (parts, body) = request.into_parts();

    let target = format!(
        "{}{}",
        rule.upstream.as_str().trim_end_matches('/'),
        rule.rewrite(parts.uri.path(), parts.uri.query())
    );

    let mut outbound = axum::http::Request::builder()
        .method(parts.method.clone())
        .uri(target);

    if let Some(headers) = outbound.headers_mut() {
        for name in ENTITY_HEADERS {
            if let Some(value) = parts.headers.get(&name) {
                headers.insert(name, value.clone());
            }
        }
        if let Some(ctx) = RequestContext::current() {
            for (name, value) in propagation_headers(&ctx) {
                if let Ok(value) = HeaderValue::from_str(&value) {
                    headers.insert(name, value);
                }
            }
        }
        if forward_authorization {
            if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
                headers.insert(header::AUTHORIZATION, value.clone());
            }
        }
    }

    let outbound = outbound
        .body(body)
        .map_err(|err| AppError::internal(format!("building upstream request: {err}")))?;

    let upstream_response =
        match tokio::time::timeout(upstream_timeout, client.request(outbound)).await {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::error!(route = rule.name, %error, "upstream request failed");
                record_upstream_error(rule.name, "connect");
                return Err(AppError::bad_gateway("Upstream request failed"));
            }
            Err(_) => {
                tracing::error!(
                    route = rule.name,
                    timeout_secs = upstream_timeout.as_secs(),
                    "upstream request timed out"
                );
                record_upstream_error(rule.name, "timeout");
                return Err(AppError::bad_gateway("Upstream request timed out"));
            }
        };

    let (mut parts, body) = upstream_response.into_parts();
    for name in HOP_BY_HOP {
        parts.headers.remove(name);
    }
    // The upstream's span belongs to its hop; the client sees ours. Its
    // trace header stays so the relay echoes it, and when the upstream sent
    // none the trace layer fills in the id this hop forwarded.
    parts.headers.remove(X_SPAN_ID);

    Ok(Response::from_parts(parts, Body::new(body)))
}
