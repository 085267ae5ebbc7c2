//! Orderlink users service library.
//!
//! Owns the user store and orchestrates the cross-service order lifecycle:
//! creating an order is a two-step saga (remote create on the orders
//! service, then an atomic back-reference append here), and bulk order
//! deletion fans out to the orders service before clearing the user's
//! back-references. Every hop carries W3C trace context.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clients;
pub mod config;
pub mod error;
pub mod routes;
pub mod saga;
pub mod state;
pub mod store;
