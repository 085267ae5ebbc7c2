//! User route handlers.
//!
//! Each handler extracts the inbound trace context, opens a request span,
//! and hands the span's context to the saga for its child steps. The span
//! guard finishes on every exit path.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};

use orderlink_core::trace::{self, Span};
use orderlink_core::{DeleteReport, NewUser, Order, OrderPayload, OrderReceipt, User, UserId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// GET / - service banner.
pub async fn root(headers: HeaderMap) -> &'static str {
    let parent = trace::extract(&headers);
    let _span = Span::start("users.process-request", parent.as_ref());
    "This is the users service"
}

/// GET /users - all users.
pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<User>>> {
    let parent = trace::extract(&headers);
    let _span = Span::start("users.get-users", parent.as_ref());

    let users = state.store().list().await?;
    Ok(Json(users))
}

/// GET /users/{uid} - single user.
pub async fn get_one(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<User>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("users.get-user-details", parent.as_ref());

    let user_id = UserId::new(uid);
    match state.store().get(&user_id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            span.set_error("user not found");
            Err(AppError::NotFound(format!("user {user_id}")))
        }
    }
}

/// GET /users/{uid}/orders - the user's orders, fetched from the orders
/// service with the trace context forwarded.
pub async fn orders_for_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("users.get-user-orders", parent.as_ref());

    let user_id = UserId::new(uid);
    match state.saga().orders_for_user(&user_id, span.context()).await {
        Ok(orders) => Ok(Json(orders)),
        Err(err) => {
            span.set_error(err.to_string());
            Err(err.into())
        }
    }
}

/// POST /user - create a user.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let parent = trace::extract(&headers);
    let _span = Span::start("users.create-user", parent.as_ref());

    let user = state.store().insert(new_user).await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /users/{uid}/order - run the create-order saga.
///
/// The three outcomes stay distinct at the boundary: validation and
/// upstream failures mean nothing happened; a partial failure means an
/// orphan order exists and the response body names it.
pub async fn create_order(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<OrderPayload>,
) -> Result<Json<OrderReceipt>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("users.post-user-order", parent.as_ref());

    let user_id = UserId::new(uid);
    match state
        .saga()
        .create_order_for_user(&user_id, payload, span.context())
        .await
    {
        Ok(receipt) => Ok(Json(receipt)),
        Err(err) => {
            span.set_error(err.to_string());
            Err(err.into())
        }
    }
}

/// DELETE /users/{uid} - delete a user.
///
/// Does not cascade to the user's orders; they stay queryable by customer
/// id and removable through the bulk path.
pub async fn delete_one(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("users.delete-user", parent.as_ref());

    let user_id = UserId::new(uid);
    if state.store().delete(&user_id).await? {
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(Json(json!({ "success": true, "message": "user deleted" })))
    } else {
        span.set_error("user not found");
        Err(AppError::NotFound(format!("user {user_id}")))
    }
}

/// DELETE /users/{uid}/orders - delete all of the user's orders via the
/// orders service, then clear the back-references.
pub async fn delete_orders(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteReport>> {
    let parent = trace::extract(&headers);
    let mut span = Span::start("users.delete-user-orders", parent.as_ref());

    let user_id = UserId::new(uid);
    match state
        .saga()
        .delete_orders_for_user(&user_id, span.context())
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(err) => {
            span.set_error(err.to_string());
            Err(err.into())
        }
    }
}
