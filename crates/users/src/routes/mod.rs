//! HTTP route handlers for the users service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                     - Service banner
//! GET    /users                - All users
//! GET    /users/{uid}          - Single user
//! GET    /users/{uid}/orders   - User's orders (delegated to orders service)
//! POST   /user                 - Create a user
//! POST   /users/{uid}/order    - Create an order for a user (saga)
//! DELETE /users/{uid}          - Delete a user (no cascade to orders)
//! DELETE /users/{uid}/orders   - Delete all of a user's orders (fan-out)
//! ```

pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the users service router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::root))
        .route("/users", get(users::list))
        .route("/users/{uid}", get(users::get_one).delete(users::delete_one))
        .route(
            "/users/{uid}/orders",
            get(users::orders_for_user).delete(users::delete_orders),
        )
        .route("/users/{uid}/order", post(users::create_order))
        .route("/user", post(users::create))
}
