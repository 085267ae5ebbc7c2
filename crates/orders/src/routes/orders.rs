//! Order route handlers.
//!
//! Every handler extracts the caller's trace context (the users service
//! injects one on each hop of the saga) and wraps its work in a span; the
//! span guard finishes on every exit path, error branches included.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};

use orderlink_core::trace::{self, Span};
use orderlink_core::{DeleteReport, NewOrder, Order, OrderId, UserId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters scoping an order lookup or bulk delete.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    /// Customer (user) id.
    pub uid: Option<String>,
    /// Order id; when present the lookup is a single-order ownership check.
    pub oid: Option<String>,
}

/// GET /orders - orders for a customer, optionally narrowed to one order.
///
/// With `uid` only: every order for that customer (empty list is success).
/// With `uid` and `oid`: the single order, only if it belongs to that
/// customer; an order owned by someone else behaves as absent.
pub async fn find(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("orders.find", parent.as_ref());

    let Some(uid) = query.uid else {
        span.set_error("missing uid");
        return Err(AppError::Validation("query parameter uid is required".to_owned()));
    };
    let customer_id = UserId::new(uid);

    match query.oid {
        None => Ok(Json(state.store().find_for_customer(&customer_id).await)),
        Some(oid) => {
            let order_id = OrderId::new(oid);
            match state.store().find_owned(&customer_id, &order_id).await {
                Some(order) => Ok(Json(vec![order])),
                None => {
                    span.set_error("order not found for customer");
                    Err(AppError::NotFound(format!(
                        "order {order_id} for customer {customer_id}"
                    )))
                }
            }
        }
    }
}

/// POST /order - create an order.
///
/// Called by the users service as step one of the create-order saga; the
/// created document (with its store-assigned id) is the response body.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new_order): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("orders.create", parent.as_ref());

    if new_order.name.trim().is_empty() {
        span.set_error("empty order name");
        return Err(AppError::Validation("order name must not be empty".to_owned()));
    }
    if new_order.qty == 0 {
        span.set_error("zero qty");
        return Err(AppError::Validation("order qty must be at least 1".to_owned()));
    }

    let order = state.store().insert(new_order).await;
    tracing::info!(order_id = %order.id, customer_id = %order.customer_id, "order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// DELETE /orders/{oid} - delete a single order.
///
/// Removes exactly that record; never touches the owning user's order list
/// (no-cascade policy). A second delete of the same id reports not found.
pub async fn delete_one(
    State(state): State<AppState>,
    Path(oid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("orders.delete", parent.as_ref());

    let order_id = OrderId::new(oid);
    if state.store().delete(&order_id).await {
        tracing::info!(order_id = %order_id, "order deleted");
        Ok(Json(json!({ "success": true, "message": "order deleted" })))
    } else {
        span.set_error("order not found");
        Err(AppError::NotFound(format!("order {order_id}")))
    }
}

/// DELETE /orders?uid= - delete every order for a customer.
///
/// Set-matching deletion; the removed count goes back to the caller so it can
/// clear the user's back-references. Zero matches is success with count 0.
pub async fn delete_for_customer(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
    headers: HeaderMap,
) -> Result<Json<DeleteReport>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("orders.delete-for-customer", parent.as_ref());

    let Some(uid) = query.uid else {
        span.set_error("missing uid");
        return Err(AppError::Validation("query parameter uid is required".to_owned()));
    };
    let customer_id = UserId::new(uid);

    let count = state.store().delete_by_customer(&customer_id).await;
    tracing::info!(customer_id = %customer_id, count, "orders deleted for customer");
    Ok(Json(DeleteReport { success: true, count }))
}
