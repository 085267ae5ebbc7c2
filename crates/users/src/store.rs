//! User repository with an atomic order-reference append.
//!
//! The store is an external collaborator; this module exposes its contract
//! behind the [`UserStore`] trait so the saga can be exercised against a
//! failing stand-in. The shipped implementation is in-memory. The one
//! operation with teeth is [`UserStore::push_order`]: it must be atomic (no
//! read-modify-write across awaits, or concurrent creations lose updates)
//! and idempotent (the order id is the idempotency key, so a retried append
//! never duplicates an entry).

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use orderlink_core::{NewUser, OrderId, User, UserId};

/// User store failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No user with the given id.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// The store could not be reached or refused the write.
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// Contract of the user store collaborator.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; the store assigns the id.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;

    /// Look up a user by id.
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// All users, in insertion order.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Delete a user by id. Returns whether a record was removed. Does not
    /// cascade to the user's orders.
    async fn delete(&self, id: &UserId) -> Result<bool, StoreError>;

    /// Atomically append an order reference to the user's `orders` sequence.
    ///
    /// Idempotent on `order_id`: appending an id already present is a no-op
    /// success, so a retry after a transient failure cannot duplicate it.
    async fn push_order(&self, id: &UserId, order_id: &OrderId) -> Result<(), StoreError>;

    /// Empty the user's `orders` sequence (after a bulk delete fan-out).
    async fn clear_orders(&self, id: &UserId) -> Result<(), StoreError>;
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    /// Create an empty user store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: UserId::generate(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            orders: new.orders,
        };

        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| &u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| &u.id != id);
        Ok(users.len() < before)
    }

    async fn push_order(&self, id: &UserId, order_id: &OrderId) -> Result<(), StoreError> {
        // Single write-lock section: lookup and append are one critical
        // section, so concurrent appends serialize instead of clobbering.
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if !user.orders.contains(order_id) {
            user.orders.push(order_id.clone());
        }
        Ok(())
    }

    async fn clear_orders(&self, id: &UserId) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        user.orders.clear();
        Ok(())
    }
}
