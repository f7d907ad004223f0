//! Liveness endpoint shared by every service binary.

use serde_json::{json, Value};

use crate::http::Envelope;

/// `GET /health`. Answered locally, never proxied.
pub async fn health() -> Envelope<Value> {
    Envelope::ok(json!({ "status": "ok" }))
}
