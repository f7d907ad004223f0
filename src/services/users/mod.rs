//! User service.
//!
//! Routes, relative to the service root:
//! - `POST /register`, `POST /login` (public)
//! - `GET /me`, `PATCH /me` (authenticated)
//! - `GET /` (admin only)
//!
//! The gateway strips its `/v1/users` prefix before forwarding, so these
//! paths are what the service actually sees.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    auth::{require_auth, TokenSigner, TokenVerifier},
    config::PlatformConfig,
    http::{self, health},
};

use store::UserStore;

/// State injected into user service handlers.
#[derive(Clone)]
pub struct UsersState {
    pub store: Arc<UserStore>,
    pub signer: TokenSigner,
    pub verifier: TokenVerifier,
}

impl UsersState {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            store: Arc::new(UserStore::new()),
            signer: TokenSigner::new(&config.jwt_secret, config.jwt_ttl_secs),
            verifier: TokenVerifier::new(&config.jwt_secret),
        }
    }
}

/// Build the user service router with the platform layer stack applied.
pub fn router(state: UsersState, config: &PlatformConfig) -> Router {
    let protected = Router::new()
        .route("/me", get(handlers::me).patch(handlers::update_me))
        .route("/", get(handlers::list_users))
        .layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_auth,
        ));

    let router = Router::new()
        .route("/health", get(health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
        .with_state(state);

    http::platform_layers(router, "users", config)
}
