//! Clients for peer services.
//!
//! The users service never talks to the order store directly; every order
//! operation goes through the orders service over HTTP. The client sits
//! behind the [`OrdersApi`] trait so the saga can run against a fake in
//! tests, with the endpoint and timeout supplied by configuration.

pub mod orders;

pub use orders::{ClientError, HttpOrdersClient, OrdersApi};
