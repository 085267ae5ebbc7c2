//! Orderlink Orders service - owns the order store.
//!
//! This binary serves the order registry on port 5151 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON request/response bodies
//! - In-memory order repository, constructed once at startup
//! - W3C trace-context extraction on every request; the users service
//!   injects its span context on each saga hop

#![cfg_attr(not(test), forbid(unsafe_code))]

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod routes;
mod state;
mod store;

use config::OrdersConfig;
use state::AppState;
use store::OrderStore;

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info if RUST_LOG is unset
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orderlink_orders=info,orderlink_core=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = OrdersConfig::from_env().expect("Failed to load configuration");

    if let Some(exporter) = &config.trace_exporter_url {
        tracing::info!(exporter = %exporter, "trace exporter configured");
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, OrderStore::new());

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "orders service listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
