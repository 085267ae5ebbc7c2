//! Order repository backed by an in-memory store.
//!
//! The store is the external collaborator of this service: the repository
//! exposes the collaborator contract (insert, scoped find, delete by id,
//! delete by filter) and nothing else. It is constructed once at startup and
//! handed to every handler through the application state; no handler touches
//! an uninitialized global.

use chrono::Utc;
use tokio::sync::RwLock;

use orderlink_core::{NewOrder, Order, OrderId, UserId};

/// Repository for order records.
///
/// Writes take the lock once per operation; bulk delete uses set-matching
/// semantics (`retain`), never first-match.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<Vec<Order>>,
}

impl OrderStore {
    /// Create an empty order store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new order; the store assigns the id and fills a missing
    /// `created_at` with the current time.
    pub async fn insert(&self, new: NewOrder) -> Order {
        let order = Order {
            id: OrderId::generate(),
            name: new.name,
            customer_id: new.customer_id,
            amount: new.amount,
            image: new.image,
            created_at: new.created_at.unwrap_or_else(Utc::now),
            qty: new.qty,
        };

        self.orders.write().await.push(order.clone());
        order
    }

    /// All orders belonging to a customer, in insertion order. Empty is a
    /// normal outcome, not an error.
    pub async fn find_for_customer(&self, customer_id: &UserId) -> Vec<Order> {
        self.orders
            .read()
            .await
            .iter()
            .filter(|o| &o.customer_id == customer_id)
            .cloned()
            .collect()
    }

    /// A single order, only if it belongs to the given customer. An order id
    /// owned by a different customer behaves as absent.
    pub async fn find_owned(&self, customer_id: &UserId, order_id: &OrderId) -> Option<Order> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| &o.id == order_id && &o.customer_id == customer_id)
            .cloned()
    }

    /// Look up an order by id regardless of owner.
    pub async fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| &o.id == order_id)
            .cloned()
    }

    /// Delete a single order by id. Returns whether a record was removed;
    /// deleting an absent id is not an error here, the boundary decides.
    pub async fn delete(&self, order_id: &OrderId) -> bool {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| &o.id != order_id);
        orders.len() < before
    }

    /// Delete every order belonging to a customer and return the count
    /// removed. Zero matches is a successful outcome.
    pub async fn delete_by_customer(&self, customer_id: &UserId) -> u64 {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| &o.customer_id != customer_id);
        (before - orders.len()) as u64
    }
}
