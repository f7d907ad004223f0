//! Gateway listener: route matching, auth gating, relay dispatch.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    response::Response,
    routing::{any, get},
    Router,
};

use crate::{
    auth::{verify_bearer, TokenVerifier},
    config::PlatformConfig,
    context::RequestContext,
    error::AppError,
    http::{self, health},
};

use super::proxy::{build_client, relay, HttpClient};
use super::rules::RouteTable;

/// State injected into the relay handler.
#[derive(Clone)]
pub struct GatewayState {
    pub table: Arc<RouteTable>,
    pub client: HttpClient,
    pub verifier: TokenVerifier,
    pub upstream_timeout: Duration,
}

impl GatewayState {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            table: Arc::new(RouteTable::default_routes(config)),
            client: build_client(),
            verifier: TokenVerifier::new(&config.jwt_secret),
            upstream_timeout: Duration::from_secs(config.upstream_timeout_secs),
        }
    }
}

/// Build the gateway router with the platform layer stack applied.
///
/// `/health` is answered locally; everything else goes through the route
/// table.
pub fn router(state: GatewayState, config: &PlatformConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/", any(relay_handler))
        .route("/{*path}", any(relay_handler))
        .with_state(state);

    http::platform_layers(router, "gateway", config)
}

/// Match a rule, apply the auth gate, relay.
///
/// When the gate rejects, the upstream is never contacted. The bearer
/// credential is forwarded only on gated routes that passed verification.
async fn relay_handler(
    State(state): State<GatewayState>,
    request: Request,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let Some(rule) = state.table.matching(&path) else {
        tracing::debug!(%path, "no route matched");
        return Err(AppError::not_found("No matching route"));
    };

    let gated = rule.auth_required && !rule.is_exempt(&method, &path);
    if gated {
        let identity = verify_bearer(request.headers(), &state.verifier)?;
        if let Some(ctx) = RequestContext::current() {
            ctx.attach_identity(identity.user_id.clone(), identity.roles.clone());
        }
    }

    tracing::debug!(route = rule.name, %method, %path, gated, "relaying request");
    relay(
        &state.client,
        rule,
        request,
        state.upstream_timeout,
        gated,
    )
    .await
}
