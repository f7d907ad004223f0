//! Order routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{Identity, Role},
    error::{AppError, AppResult},
    events::{order_created, order_status_updated},
    http::{AppJson, AppQuery, Envelope},
    pagination::{Page, PageParams},
};

use super::store::{OrderItem, OrderRecord, OrderStatus};
use super::OrdersState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Wire projection of an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&OrderRecord> for OrderDto {
    fn from(record: &OrderRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.clone(),
            items: record.items.clone(),
            total_amount: record.total_amount,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// `POST /`
pub async fn create_order(
    State(state): State<OrdersState>,
    Extension(identity): Extension<Identity>,
    AppJson(body): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Envelope<OrderDto>)> {
    if body.items.is_empty() {
        return Err(AppError::bad_request("items must not be empty"));
    }
    for item in &body.items {
        if item.quantity < 1 {
            return Err(AppError::bad_request("item quantity must be at least 1"));
        }
        if item.price < 0.0 {
            return Err(AppError::bad_request("item price must not be negative"));
        }
    }

    let items: Vec<OrderItem> = body
        .items
        .into_iter()
        .map(|item| OrderItem {
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
        })
        .collect();
    let total_amount = items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();

    let now = Utc::now();
    let record = OrderRecord {
        id: Uuid::new_v4(),
        user_id: identity.user_id.clone(),
        items,
        total_amount,
        status: OrderStatus::Created,
        created_at: now,
        updated_at: now,
    };

    let dto = OrderDto::from(&record);
    state.store.insert(record);
    state.publisher.publish(order_created(
        &dto.id.to_string(),
        &dto.user_id,
        dto.total_amount,
    ));

    tracing::info!(order_id = %dto.id, user_id = %dto.user_id, "order created");
    Ok((StatusCode::CREATED, Envelope::ok(dto)))
}

/// `GET /{id}`
///
/// Lookup runs before the ownership check, so an existing order that belongs
/// to someone else is a 403, never a 404.
pub async fn get_order(
    State(state): State<OrdersState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Envelope<OrderDto>> {
    let order = lookup(&state, &id)?;
    assert_ownership(&order, &identity)?;
    Ok(Envelope::ok(OrderDto::from(&order)))
}

/// `GET /`
pub async fn list_orders(
    State(state): State<OrdersState>,
    Extension(identity): Extension<Identity>,
    AppQuery(page): AppQuery<PageParams>,
    AppQuery(query): AppQuery<ListOrdersQuery>,
) -> AppResult<Envelope<Page<OrderDto>>> {
    let pagination = page.resolve()?;

    let mut orders = state.store.for_user(&identity.user_id);
    if let Some(status) = query.status {
        orders.retain(|order| order.status == status);
    }

    let direction = query.direction.unwrap_or(SortDirection::Asc);
    match query.sort.unwrap_or(SortField::CreatedAt) {
        SortField::CreatedAt => {
            orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        }
        SortField::Status => {
            orders.sort_by(|a, b| {
                a.status
                    .as_str()
                    .cmp(b.status.as_str())
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            });
        }
    }
    if direction == SortDirection::Desc {
        orders.reverse();
    }

    let total = orders.len();
    let items = orders
        .iter()
        .skip(pagination.offset())
        .take(pagination.limit())
        .map(OrderDto::from)
        .collect();

    Ok(Envelope::ok(Page::new(items, total, pagination)))
}

/// `PATCH /{id}/status`
///
/// Managers may update any order; everyone else only their own.
pub async fn update_status(
    State(state): State<OrdersState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateStatusRequest>,
) -> AppResult<Envelope<OrderDto>> {
    let order = lookup(&state, &id)?;

    if !identity.has_any(&[Role::Manager]) && order.user_id != identity.user_id {
        return Err(AppError::forbidden(
            "Insufficient permissions to update order status",
        ));
    }

    let updated = state
        .store
        .update_status(order.id, body.status)
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    state.publisher.publish(order_status_updated(
        &updated.id.to_string(),
        &updated.user_id,
        updated.status.as_str(),
    ));

    tracing::info!(order_id = %updated.id, status = updated.status.as_str(), "order status updated");
    Ok(Envelope::ok(OrderDto::from(&updated)))
}

/// `DELETE /{id}`
///
/// Cancellation is soft: the order stays, its status becomes `cancelled`.
pub async fn cancel_order(
    State(state): State<OrdersState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Envelope<OrderDto>> {
    let order = lookup(&state, &id)?;
    assert_ownership(&order, &identity)?;

    if order.status == OrderStatus::Completed {
        return Err(AppError::bad_request("Cannot cancel completed order"));
    }

    let updated = state
        .store
        .update_status(order.id, OrderStatus::Cancelled)
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    tracing::info!(order_id = %updated.id, "order cancelled");
    Ok(Envelope::ok(OrderDto::from(&updated)))
}

/// Malformed ids are indistinguishable from unknown ones.
fn lookup(state: &OrdersState, id: &str) -> AppResult<OrderRecord> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::not_found("Order not found"))?;
    state
        .store
        .get(id)
        .ok_or_else(|| AppError::not_found("Order not found"))
}

fn assert_ownership(order: &OrderRecord, identity: &Identity) -> AppResult<()> {
    if order.user_id != identity.user_id {
        return Err(AppError::forbidden("You cannot access this order"));
    }
    Ok(())
}
