//! Response envelopes.
//!
//! Every service boundary speaks the same two wire shapes:
//! `{"success":true,"data":...}` and
//! `{"success":false,"error":{"code","message","requestId"}}`.
//! Nothing below the boundary writes a body directly.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success wrapper.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Failure wrapper, correlated with the request id when one exists.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                request_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_shape() {
        let json = serde_json::to_value(Envelope::ok(serde_json::json!({"status": "ok"})))
            .expect("serialize");
        assert_eq!(json, serde_json::json!({"success": true, "data": {"status": "ok"}}));
    }

    #[test]
    fn error_shape_with_request_id() {
        let json = serde_json::to_value(ErrorEnvelope::new(
            "not_found",
            "Order not found",
            Some("req-9".into()),
        ))
        .expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {"code": "not_found", "message": "Order not found", "requestId": "req-9"}
            })
        );
    }

    #[test]
    fn request_id_is_absent_without_context() {
        let json = serde_json::to_value(ErrorEnvelope::new("internal_error", "Internal server error", None))
            .expect("serialize");
        assert!(json["error"].get("requestId").is_none());
    }
}
