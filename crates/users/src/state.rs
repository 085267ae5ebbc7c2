//! Application state shared across handlers.

use std::sync::Arc;

use crate::clients::OrdersApi;
use crate::config::UsersConfig;
use crate::saga::OrderSaga;
use crate::store::UserStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; built once in `main` after configuration
/// loads, then passed explicitly to the router. The saga shares the store
/// and orders client handles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: UsersConfig,
    store: Arc<dyn UserStore>,
    saga: OrderSaga,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: UsersConfig,
        store: Arc<dyn UserStore>,
        orders: Arc<dyn OrdersApi>,
    ) -> Self {
        let saga = OrderSaga::new(Arc::clone(&store), orders);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                saga,
            }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &UsersConfig {
        &self.inner.config
    }

    /// Get a reference to the user repository.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the order lifecycle saga.
    #[must_use]
    pub fn saga(&self) -> &OrderSaga {
        &self.inner.saga
    }
}
