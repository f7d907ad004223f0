//! In-memory order records.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One line item. Price is per unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct OrderStore {
    orders: DashMap<Uuid, OrderRecord>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: OrderRecord) {
        self.orders.insert(record.id, record);
    }

    pub fn get(&self, id: Uuid) -> Option<OrderRecord> {
        self.orders.get(&id).map(|record| record.value().clone())
    }

    /// Replace the status and touch `updated_at`, returning the new record.
    pub fn update_status(&self, id: Uuid, status: OrderStatus) -> Option<OrderRecord> {
        let mut record = self.orders.get_mut(&id)?;
        record.status = status;
        record.updated_at = Utc::now();
        Some(record.value().clone())
    }

    /// Every order owned by `user_id`, in no particular order.
    pub fn for_user(&self, user_id: &str) -> Vec<OrderRecord> {
        self.orders
            .iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.value().clone())
            .collect()
    }
}
