//! HTTP route handlers for the orders service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /orders?uid=&oid=  - Orders scoped by customer (oid adds ownership check)
//! POST   /order             - Create an order
//! DELETE /orders/{oid}      - Delete a single order
//! DELETE /orders?uid=       - Delete all orders for a customer
//! ```

pub mod orders;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the orders service router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::find).delete(orders::delete_for_customer))
        .route("/order", post(orders::create))
        .route("/orders/{oid}", delete(orders::delete_one))
}
