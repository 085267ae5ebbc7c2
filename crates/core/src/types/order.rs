//! The `Order` model and its wire payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, UserId};

/// An order record, owned by the orders service.
///
/// `customer_id` references a `User` by id. The order store does not enforce
/// it as a foreign key; referential integrity is maintained only by the
/// order lifecycle saga in the users service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub customer_id: UserId,
    pub amount: f64,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub qty: u32,
}

/// Create-order request body accepted by the orders service (`POST /order`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub name: String,
    pub customer_id: UserId,
    pub amount: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub qty: u32,
}

/// Order fields accepted by the users service when creating an order on
/// behalf of a user (`POST /users/{uid}/order`). The saga supplies the
/// `customer_id` from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub qty: u32,
}

impl OrderPayload {
    /// Attach the owning customer to produce the orders-service request body.
    #[must_use]
    pub fn into_new_order(self, customer_id: UserId) -> NewOrder {
        NewOrder {
            name: self.name,
            customer_id,
            amount: self.amount,
            image: self.image,
            created_at: self.created_at,
            qty: self.qty,
        }
    }
}

/// Result body of a bulk delete (`DELETE /orders?uid=` and the users-service
/// fan-out that wraps it). Zero removed is a success, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub success: bool,
    pub count: u64,
}
