//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::OrdersConfig;
use crate::store::OrderStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; built once in `main` after configuration
/// loads, then passed explicitly to the router.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: OrdersConfig,
    store: OrderStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: OrdersConfig, store: OrderStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &OrdersConfig {
        &self.inner.config
    }

    /// Get a reference to the order repository.
    #[must_use]
    pub fn store(&self) -> &OrderStore {
        &self.inner.store
    }
}
