//! Application error taxonomy.
//!
//! Every failure that reaches a client is one of these variants, and every
//! variant maps to exactly one status code and one stable machine code.
//! Handlers return `AppError` and the [`IntoResponse`] impl renders the
//! envelope, so no handler ever writes an error body by hand.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{context::RequestContext, http::ErrorEnvelope};

/// Result type for handler and service operations.
pub type AppResult<T> = Result<T, AppError>;

/// Client-visible failure classes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or semantically invalid request payload.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or unverifiable credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Verified identity lacks the right to the resource.
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Upstream service unreachable or timed out.
    #[error("{0}")]
    BadGateway(String),

    /// Unexpected failure. The inner detail is logged, never sent.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::BadGateway(message.into())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }

    /// HTTP status for this failure class.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::BadGateway(_) => "bad_gateway",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = RequestContext::current().map(|ctx| ctx.request_id());

        // Internal details are for operators, not clients.
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(
                    error = %detail,
                    request_id = request_id.as_deref().unwrap_or("-"),
                    "unhandled internal error"
                );
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let envelope = ErrorEnvelope::new(self.code(), message, request_id);
        (self.status(), Json(envelope)).into_response()
    }
}
