//! Domain events emitted by the order service.
//!
//! Publication is in-process for now; the trait is the seam a broker-backed
//! publisher would implement. Delivery is fire-and-forget: event publication
//! never fails a request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Mutex;

/// Something that happened, described for downstream consumers.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
    #[serde(rename = "occurredAt")]
    pub occurred_at: DateTime<Utc>,
}

pub fn order_created(order_id: &str, user_id: &str, total_amount: f64) -> DomainEvent {
    DomainEvent {
        kind: "order.created".to_string(),
        payload: json!({
            "orderId": order_id,
            "userId": user_id,
            "totalAmount": total_amount,
        }),
        occurred_at: Utc::now(),
    }
}

pub fn order_status_updated(order_id: &str, user_id: &str, status: &str) -> DomainEvent {
    DomainEvent {
        kind: "order.status_updated".to_string(),
        payload: json!({
            "orderId": order_id,
            "userId": user_id,
            "status": status,
        }),
        occurred_at: Utc::now(),
    }
}

/// Sink for domain events.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

/// Publisher that appends to an in-memory log.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far, oldest first.
    pub fn snapshot(&self) -> Vec<DomainEvent> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DomainEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: DomainEvent) {
        self.lock().push(event);
    }
}
