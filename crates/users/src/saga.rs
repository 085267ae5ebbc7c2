//! The cross-service order lifecycle saga.
//!
//! Creating an order spans two stores that share no transaction: the order
//! document lives in the orders service, the back-reference lives in the
//! user document here. The saga keeps them consistent through strict step
//! ordering and explicit partial-failure signaling:
//!
//! 1. Remote create on the orders service. If this fails, nothing was
//!    written anywhere - abort with an upstream error.
//! 2. Atomic append of the new order id to the user's `orders` sequence.
//!    If this fails, an orphan order now exists; the saga reports a partial
//!    failure carrying the order id so a caller can complete the
//!    back-reference (the append is idempotent on the order id) or delete
//!    the orphan.
//!
//! Bulk deletion runs the other way: fan out to the orders service, then
//! clear the user's back-references once the removed count comes back.
//!
//! Each step runs under its own child span of the request span, and the
//! client injects that span's context outbound, so all hops of one request
//! share a trace.

use std::sync::Arc;

use thiserror::Error;

use orderlink_core::trace::{Span, SpanContext};
use orderlink_core::{DeleteReport, Order, OrderId, OrderPayload, OrderReceipt, User, UserId};

use crate::clients::{ClientError, OrdersApi};
use crate::store::{StoreError, UserStore};

/// Saga failures, one variant per caller-visible outcome.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Missing or invalid payload field; nothing was attempted.
    #[error("invalid order payload: {0}")]
    Validation(String),

    /// The owning user does not exist; nothing was attempted.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The remote step failed; no local mutation occurred.
    #[error("orders service call failed: {0}")]
    Upstream(#[from] ClientError),

    /// The remote create succeeded but the back-reference append failed.
    /// `order_id` is the orphan; retrying the append with it is safe.
    #[error("order {order_id} created but back-reference append failed: {source}")]
    PartialFailure {
        order_id: OrderId,
        source: StoreError,
    },

    /// Local store failure outside the two saga steps.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates the order lifecycle across the user store and the orders
/// service client.
#[derive(Clone)]
pub struct OrderSaga {
    store: Arc<dyn UserStore>,
    orders: Arc<dyn OrdersApi>,
}

impl OrderSaga {
    /// Create a saga over the given store and orders client.
    pub fn new(store: Arc<dyn UserStore>, orders: Arc<dyn OrdersApi>) -> Self {
        Self { store, orders }
    }

    /// Create an order for a user: remote create, then atomic back-reference
    /// append. On overall success the user's `orders` sequence contains the
    /// returned id exactly once.
    pub async fn create_order_for_user(
        &self,
        user_id: &UserId,
        payload: OrderPayload,
        parent: &SpanContext,
    ) -> Result<OrderReceipt, SagaError> {
        validate_payload(&payload)?;

        let user = self.require_user(user_id).await?;

        // Step 1: remote create. Failure here is the safe case - the user
        // document has not been touched.
        let mut remote_span = Span::start("order-saga.remote-create", Some(parent));
        let order = match self
            .orders
            .create_order(payload.into_new_order(user_id.clone()), remote_span.context())
            .await
        {
            Ok(order) => order,
            Err(err) => {
                remote_span.set_error(err.to_string());
                return Err(SagaError::Upstream(err));
            }
        };
        drop(remote_span);

        // Step 2: append the back-reference. The order id is the idempotency
        // key, so a retry after a transient failure cannot duplicate it.
        let mut append_span = Span::start("order-saga.append-reference", Some(parent));
        if let Err(source) = self.store.push_order(user_id, &order.id).await {
            append_span.set_error(source.to_string());
            tracing::error!(
                user_id = %user_id,
                order_id = %order.id,
                error = %source,
                "order created but back-reference append failed"
            );
            return Err(SagaError::PartialFailure {
                order_id: order.id,
                source,
            });
        }
        drop(append_span);

        tracing::info!(user_id = %user_id, order_id = %order.id, "order created and linked");
        Ok(OrderReceipt {
            message: format!("order created for user {}", user.email),
            user_id: user.id,
            email: user.email,
            order_id: order.id,
        })
    }

    /// Delete every order belonging to a user, then clear the user's
    /// back-references. Returns the orders service's removed count; zero is
    /// a normal outcome.
    pub async fn delete_orders_for_user(
        &self,
        user_id: &UserId,
        parent: &SpanContext,
    ) -> Result<DeleteReport, SagaError> {
        self.require_user(user_id).await?;

        let mut remote_span = Span::start("order-saga.remote-delete", Some(parent));
        let report = match self
            .orders
            .delete_for_customer(user_id, remote_span.context())
            .await
        {
            Ok(report) => report,
            Err(err) => {
                remote_span.set_error(err.to_string());
                return Err(SagaError::Upstream(err));
            }
        };
        drop(remote_span);

        // The remote records are gone; clearing the list restores the
        // referential invariant.
        self.store.clear_orders(user_id).await?;

        tracing::info!(user_id = %user_id, count = report.count, "orders deleted for user");
        Ok(report)
    }

    /// All orders for a user, delegated to the orders service.
    pub async fn orders_for_user(
        &self,
        user_id: &UserId,
        parent: &SpanContext,
    ) -> Result<Vec<Order>, SagaError> {
        self.require_user(user_id).await?;

        let mut span = Span::start("order-saga.remote-find", Some(parent));
        match self.orders.orders_for_customer(user_id, span.context()).await {
            Ok(orders) => Ok(orders),
            Err(err) => {
                span.set_error(err.to_string());
                Err(SagaError::Upstream(err))
            }
        }
    }

    async fn require_user(&self, user_id: &UserId) -> Result<User, SagaError> {
        self.store
            .get(user_id)
            .await?
            .ok_or_else(|| SagaError::UserNotFound(user_id.clone()))
    }
}

fn validate_payload(payload: &OrderPayload) -> Result<(), SagaError> {
    if payload.name.trim().is_empty() {
        return Err(SagaError::Validation("order name must not be empty".to_owned()));
    }
    if payload.qty == 0 {
        return Err(SagaError::Validation("order qty must be at least 1".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use orderlink_core::trace::finished_span_count;
    use orderlink_core::{NewOrder, NewUser};

    use super::*;
    use crate::store::InMemoryUserStore;

    /// Fake orders service: records creates, fails on demand.
    #[derive(Default)]
    struct FakeOrders {
        fail_create: bool,
        fail_delete: bool,
        delete_count: u64,
        created: Mutex<Vec<NewOrder>>,
    }

    #[async_trait]
    impl OrdersApi for FakeOrders {
        async fn create_order(
            &self,
            order: NewOrder,
            _context: &SpanContext,
        ) -> Result<Order, ClientError> {
            if self.fail_create {
                return Err(ClientError::Status {
                    status: 503,
                    body: "unavailable".to_owned(),
                });
            }

            let created = Order {
                id: OrderId::generate(),
                name: order.name.clone(),
                customer_id: order.customer_id.clone(),
                amount: order.amount,
                image: order.image.clone(),
                created_at: order.created_at.unwrap_or_else(Utc::now),
                qty: order.qty,
            };
            self.created.lock().expect("lock").push(order);
            Ok(created)
        }

        async fn orders_for_customer(
            &self,
            _customer_id: &UserId,
            _context: &SpanContext,
        ) -> Result<Vec<Order>, ClientError> {
            Ok(Vec::new())
        }

        async fn delete_for_customer(
            &self,
            _customer_id: &UserId,
            _context: &SpanContext,
        ) -> Result<DeleteReport, ClientError> {
            if self.fail_delete {
                return Err(ClientError::Status {
                    status: 503,
                    body: "unavailable".to_owned(),
                });
            }
            Ok(DeleteReport {
                success: true,
                count: self.delete_count,
            })
        }
    }

    /// Store wrapper whose next N appends fail, simulating a transient
    /// store outage between the two saga steps.
    struct FlakyStore {
        inner: InMemoryUserStore,
        failing_pushes: AtomicU32,
    }

    impl FlakyStore {
        fn failing_next(n: u32) -> Self {
            Self {
                inner: InMemoryUserStore::new(),
                failing_pushes: AtomicU32::new(n),
            }
        }
    }

    #[async_trait]
    impl UserStore for FlakyStore {
        async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
            self.inner.insert(new).await
        }
        async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
            self.inner.get(id).await
        }
        async fn list(&self) -> Result<Vec<User>, StoreError> {
            self.inner.list().await
        }
        async fn delete(&self, id: &UserId) -> Result<bool, StoreError> {
            self.inner.delete(id).await
        }
        async fn push_order(&self, id: &UserId, order_id: &OrderId) -> Result<(), StoreError> {
            let remaining = self.failing_pushes.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_pushes.store(remaining - 1, Ordering::SeqCst);
                return Err(StoreError::Unavailable("simulated outage".to_owned()));
            }
            self.inner.push_order(id, order_id).await
        }
        async fn clear_orders(&self, id: &UserId) -> Result<(), StoreError> {
            self.inner.clear_orders(id).await
        }
    }

    fn ada() -> NewUser {
        NewUser {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            address: "1 Analytical Way".to_owned(),
            orders: Vec::new(),
        }
    }

    fn widget() -> OrderPayload {
        OrderPayload {
            name: "Widget".to_owned(),
            amount: 20.0,
            image: None,
            created_at: None,
            qty: 1,
        }
    }

    fn saga_with(
        store: Arc<dyn UserStore>,
        orders: Arc<dyn OrdersApi>,
    ) -> OrderSaga {
        OrderSaga::new(store, orders)
    }

    #[tokio::test]
    async fn success_appends_the_order_id_exactly_once() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        let saga = saga_with(store.clone(), Arc::new(FakeOrders::default()));

        let receipt = saga
            .create_order_for_user(&user.id, widget(), &SpanContext::new_root())
            .await
            .expect("saga succeeds");

        assert_eq!(receipt.user_id, user.id);
        assert_eq!(receipt.email, "ada@example.com");

        let user = store.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(user.orders, vec![receipt.order_id]);
    }

    #[tokio::test]
    async fn upstream_failure_leaves_the_user_untouched() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        let before = store.get(&user.id).await.expect("get").expect("exists");

        let orders = Arc::new(FakeOrders {
            fail_create: true,
            ..FakeOrders::default()
        });
        let saga = saga_with(store.clone(), orders);

        let err = saga
            .create_order_for_user(&user.id, widget(), &SpanContext::new_root())
            .await
            .expect_err("upstream fails");
        assert!(matches!(err, SagaError::Upstream(_)));

        let after = store.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn append_failure_is_a_partial_failure_carrying_the_orphan_id() {
        let store = Arc::new(FlakyStore::failing_next(u32::MAX));
        let user = store.insert(ada()).await.expect("insert");
        let orders = Arc::new(FakeOrders::default());
        let saga = saga_with(store, orders.clone());

        let err = saga
            .create_order_for_user(&user.id, widget(), &SpanContext::new_root())
            .await
            .expect_err("append fails");

        // The remote create really happened; the error must say so and name
        // the orphan, never masquerade as success or as "nothing happened".
        assert_eq!(orders.created.lock().expect("lock").len(), 1);
        assert!(matches!(err, SagaError::PartialFailure { .. }));
    }

    #[tokio::test]
    async fn recovery_append_after_partial_failure_does_not_duplicate() {
        let store = Arc::new(FlakyStore::failing_next(1));
        let user = store.insert(ada()).await.expect("insert");
        let saga = saga_with(store.clone(), Arc::new(FakeOrders::default()));

        let err = saga
            .create_order_for_user(&user.id, widget(), &SpanContext::new_root())
            .await
            .expect_err("first append fails");
        let SagaError::PartialFailure { order_id, .. } = err else {
            panic!("expected partial failure, got {err:?}");
        };

        // The caller completes the back-reference with the reported orphan
        // id; the append is idempotent so doing it twice changes nothing.
        store.push_order(&user.id, &order_id).await.expect("recovery");
        store.push_order(&user.id, &order_id).await.expect("repeat recovery");

        let user = store.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(user.orders, vec![order_id]);
    }

    #[tokio::test]
    async fn concurrent_creations_yield_exactly_n_entries() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        let saga = saga_with(store.clone(), Arc::new(FakeOrders::default()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let saga = saga.clone();
            let user_id = user.id.clone();
            handles.push(tokio::spawn(async move {
                saga.create_order_for_user(&user_id, widget(), &SpanContext::new_root())
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("saga succeeds");
        }

        let user = store.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(user.orders.len(), 8);

        let mut distinct = user.orders.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 8);
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_the_orders_service() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        let orders = Arc::new(FakeOrders::default());
        let saga = saga_with(store, orders.clone());

        let mut empty_name = widget();
        empty_name.name = " ".to_owned();
        let err = saga
            .create_order_for_user(&user.id, empty_name, &SpanContext::new_root())
            .await
            .expect_err("validation");
        assert!(matches!(err, SagaError::Validation(_)));

        let mut zero_qty = widget();
        zero_qty.qty = 0;
        let err = saga
            .create_order_for_user(&user.id, zero_qty, &SpanContext::new_root())
            .await
            .expect_err("validation");
        assert!(matches!(err, SagaError::Validation(_)));

        assert!(orders.created.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn missing_user_aborts_before_the_remote_call() {
        let orders = Arc::new(FakeOrders::default());
        let saga = saga_with(Arc::new(InMemoryUserStore::new()), orders.clone());

        let err = saga
            .create_order_for_user(&UserId::new("u-none"), widget(), &SpanContext::new_root())
            .await
            .expect_err("user missing");
        assert!(matches!(err, SagaError::UserNotFound(_)));
        assert!(orders.created.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_reports_count_and_clears_back_references() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        store.push_order(&user.id, &OrderId::new("o-1")).await.expect("push");
        store.push_order(&user.id, &OrderId::new("o-2")).await.expect("push");
        store.push_order(&user.id, &OrderId::new("o-3")).await.expect("push");

        let orders = Arc::new(FakeOrders {
            delete_count: 3,
            ..FakeOrders::default()
        });
        let saga = saga_with(store.clone(), orders);

        let report = saga
            .delete_orders_for_user(&user.id, &SpanContext::new_root())
            .await
            .expect("bulk delete succeeds");
        assert_eq!(report, DeleteReport { success: true, count: 3 });

        let user = store.get(&user.id).await.expect("get").expect("exists");
        assert!(user.orders.is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_upstream_failure_keeps_back_references() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        store.push_order(&user.id, &OrderId::new("o-1")).await.expect("push");

        let orders = Arc::new(FakeOrders {
            fail_delete: true,
            ..FakeOrders::default()
        });
        let saga = saga_with(store.clone(), orders);

        let err = saga
            .delete_orders_for_user(&user.id, &SpanContext::new_root())
            .await
            .expect_err("upstream fails");
        assert!(matches!(err, SagaError::Upstream(_)));

        let user = store.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(user.orders, vec![OrderId::new("o-1")]);
    }

    #[tokio::test]
    async fn saga_finishes_its_step_spans_on_success_and_failure() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = store.insert(ada()).await.expect("insert");
        let saga = saga_with(store, Arc::new(FakeOrders::default()));

        let before = finished_span_count();
        saga.create_order_for_user(&user.id, widget(), &SpanContext::new_root())
            .await
            .expect("saga succeeds");
        // Two step spans: remote create and append.
        assert_eq!(finished_span_count(), before + 2);

        let failing = saga_with(
            Arc::new(FlakyStore::failing_next(u32::MAX)),
            Arc::new(FakeOrders::default()),
        );
        let user2 = failing.store.insert(ada()).await.expect("insert");
        let before = finished_span_count();
        let _ = failing
            .create_order_for_user(&user2.id, widget(), &SpanContext::new_root())
            .await;
        // Both spans still finish when the append step errors out.
        assert_eq!(finished_span_count(), before + 2);
    }
}
