//! Orderlink orders service library.
//!
//! Owns the order store and exposes create, scoped query, single delete, and
//! bulk delete-by-customer over HTTP. The users service is its only caller
//! for writes; every inbound request carries (or starts) a trace context.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
