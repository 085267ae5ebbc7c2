//! Orderlink Core - Shared types library.
//!
//! This crate provides common types used across both Orderlink services:
//! - `users` - User registry service (owns the user store)
//! - `orders` - Order registry service (owns the order store)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no HTTP
//! clients. The one piece of behavior it carries is the trace-context
//! carrier, which both services need on every request hop.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the `User`/`Order` models, and wire payloads
//! - [`trace`] - W3C trace-context extraction, injection, and span guards

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod trace;
pub mod types;

pub use types::*;
