//! Order service.
//!
//! Every order route requires an authenticated caller; only `/health` is
//! open. Mutations publish domain events through the configured publisher.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::{
    auth::{require_auth, TokenVerifier},
    config::PlatformConfig,
    events::{EventPublisher, InMemoryEventPublisher},
    http::{self, health},
};

use store::OrderStore;

/// State injected into order service handlers.
#[derive(Clone)]
pub struct OrdersState {
    pub store: Arc<OrderStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub verifier: TokenVerifier,
}

impl OrdersState {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            store: Arc::new(OrderStore::new()),
            publisher: Arc::new(InMemoryEventPublisher::new()),
            verifier: TokenVerifier::new(&config.jwt_secret),
        }
    }
}

/// Build the order service router with the platform layer stack applied.
pub fn router(state: OrdersState, config: &PlatformConfig) -> Router {
    let protected = Router::new()
        .route("/", post(handlers::create_order).get(handlers::list_orders))
        .route(
            "/{id}",
            get(handlers::get_order).delete(handlers::cancel_order),
        )
        .route("/{id}/status", patch(handlers::update_status))
        .layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_auth,
        ));

    let router = Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state);

    http::platform_layers(router, "orders", config)
}
