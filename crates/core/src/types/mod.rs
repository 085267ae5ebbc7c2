//! Shared types for Orderlink services.
//!
//! # Modules
//!
//! - [`id`] - Type-safe ID newtypes (`UserId`, `OrderId`)
//! - [`user`] - The `User` model and its wire payloads
//! - [`order`] - The `Order` model and its wire payloads

pub mod id;
pub mod order;
pub mod user;

pub use id::{OrderId, UserId};
pub use order::{DeleteReport, NewOrder, Order, OrderPayload};
pub use user::{NewUser, OrderReceipt, User};
