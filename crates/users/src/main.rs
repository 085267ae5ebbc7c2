//! Orderlink Users service - owns the user store and the order saga.
//!
//! This binary serves the user registry on port 5050 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON request/response bodies
//! - In-memory user repository, constructed once at startup
//! - Reqwest client for the orders service with a bounded per-call timeout
//! - W3C trace-context extraction on every request and injection on every
//!   outbound hop of the order lifecycle saga

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clients;
mod config;
mod error;
mod routes;
mod saga;
mod state;
mod store;

use clients::HttpOrdersClient;
use config::UsersConfig;
use state::AppState;
use store::InMemoryUserStore;

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info if RUST_LOG is unset
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orderlink_users=info,orderlink_core=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = UsersConfig::from_env().expect("Failed to load configuration");

    if let Some(exporter) = &config.trace_exporter_url {
        tracing::info!(exporter = %exporter, "trace exporter configured");
    }

    let orders_client = HttpOrdersClient::new(&config.orders_base_url, config.orders_timeout)
        .expect("Failed to build orders client");
    tracing::info!(orders_base_url = %config.orders_base_url, "orders client ready");

    let addr = config.socket_addr();
    let state = AppState::new(
        config,
        Arc::new(InMemoryUserStore::new()),
        Arc::new(orders_client),
    );

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "users service listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
