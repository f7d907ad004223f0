//! Authentication gate.
//!
//! # State machine
//! ```text
//! unauthenticated → verifying → authenticated  (identity attached)
//!                             → rejected       (missing | invalid)
//! ```
//!
//! Verification is a pure function over the inbound headers so the gateway
//! can invoke it per route rule while the services mount it as middleware on
//! their protected subtrees. On success the identity lands in the request
//! context and the request extensions in one step; on failure nothing is
//! attached and the error path runs.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::context::RequestContext;
use crate::error::AppError;

use super::roles::{Role, RoleSet};
use super::token::TokenVerifier;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified caller identity.
///
/// Produced only by [`verify_bearer`]; immutable once attached.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub roles: RoleSet,
}

impl Identity {
    pub fn has_any(&self, required: &[Role]) -> bool {
        self.roles.intersects(required)
    }

    /// Role gate: reject with `forbidden` when the caller holds none of the
    /// required roles. Runs only after authentication succeeded, so the
    /// failure status is always distinct from an authentication failure.
    pub fn require_any(&self, required: &[Role]) -> Result<(), AppError> {
        if self.has_any(required) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient permissions"))
        }
    }
}

/// Why the gate rejected. Both map to 401, but the reasons stay
/// distinguishable for logs and tests.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credential, or the header is not `Bearer <token>`.
    #[error("Authorization header missing")]
    MissingCredential,
    /// Credential present but the signature, structure, or expiry failed.
    #[error("Invalid token")]
    InvalidCredential,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::unauthorized(err.to_string())
    }
}

/// Run the verification state machine against the inbound headers.
pub fn verify_bearer(headers: &HeaderMap, verifier: &TokenVerifier) -> Result<Identity, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingCredential)?;

    match verifier.verify(token) {
        Ok(claims) => Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
        }),
        Err(err) => {
            tracing::debug!(reason = %err, "bearer credential rejected");
            Err(AuthError::InvalidCredential)
        }
    }
}

/// Middleware for routes that require an authenticated caller.
///
/// Handlers behind this layer extract the identity with
/// `Extension<Identity>`.
pub async fn require_auth(
    State(verifier): State<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = verify_bearer(request.headers(), &verifier)?;

    if let Some(ctx) = RequestContext::current() {
        ctx.attach_identity(identity.user_id.clone(), identity.roles.clone());
    }
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
