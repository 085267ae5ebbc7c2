//! The `User` model and its wire payloads.

use serde::{Deserialize, Serialize};

use super::id::{OrderId, UserId};

/// A user record, owned by the users service.
///
/// `orders` is an ordered sequence of weak references: the user does not own
/// the order lifetime, and every entry is expected (eventually, not
/// atomically) to name an order whose `customer_id` is this user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub orders: Vec<OrderId>,
}

/// Create-user request body (`POST /user`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub orders: Vec<OrderId>,
}

/// Success body of the create-order saga (`POST /users/{uid}/order`).
///
/// Carries the user's identity and the newly created order id, so the caller
/// can verify the back-reference without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub message: String,
    pub user_id: UserId,
    pub email: String,
    pub order_id: OrderId,
}
