//! Integration tests for Orderlink.
//!
//! # Running Tests
//!
//! ```bash
//! # Start both services
//! cargo run -p orderlink-orders &
//! cargo run -p orderlink-users &
//!
//! # Run the cross-service scenarios
//! cargo test -p orderlink-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `saga_scenarios` - Cross-service order lifecycle scenarios (create,
//!   upstream outage, bulk delete, ownership-scoped queries)
//!
//! Base URLs are configurable via `USERS_BASE_URL` and `ORDERS_BASE_URL`.

/// Base URL for the users service (configurable via environment).
#[must_use]
pub fn users_base_url() -> String {
    std::env::var("USERS_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:5050".to_owned())
}

/// Base URL for the orders service (configurable via environment).
#[must_use]
pub fn orders_base_url() -> String {
    std::env::var("ORDERS_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:5151".to_owned())
}
