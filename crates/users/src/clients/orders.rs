//! HTTP client for the orders service.
//!
//! Every call carries a bounded timeout and injects the current span's
//! context into the outbound headers, so the orders service's extracted
//! parent is the span that made the call. Transport failures (unreachable,
//! timed out) and application failures (non-success status) surface as
//! distinct error variants; the saga maps both to its upstream error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use thiserror::Error;

use orderlink_core::trace::{self, SpanContext};
use orderlink_core::{DeleteReport, NewOrder, Order, UserId};

/// Errors from calls to the orders service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed: connection refused, DNS failure, or the
    /// configured timeout expired.
    #[error("orders service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The orders service answered with a non-success status.
    #[error("orders service returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl ClientError {
    /// Whether the failure was the configured timeout expiring.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Contract of the orders service as seen by the saga.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Create an order remotely; the response is the created document with
    /// its store-assigned id.
    async fn create_order(
        &self,
        order: NewOrder,
        context: &SpanContext,
    ) -> Result<Order, ClientError>;

    /// All orders for a customer.
    async fn orders_for_customer(
        &self,
        customer_id: &UserId,
        context: &SpanContext,
    ) -> Result<Vec<Order>, ClientError>;

    /// Delete every order for a customer; the report carries the removed
    /// count so the caller can clear the user's back-references.
    async fn delete_for_customer(
        &self,
        customer_id: &UserId,
        context: &SpanContext,
    ) -> Result<DeleteReport, ClientError>;
}

/// Reqwest-backed orders service client.
#[derive(Clone)]
pub struct HttpOrdersClient {
    inner: Arc<HttpOrdersClientInner>,
}

struct HttpOrdersClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrdersClient {
    /// Create a client for the orders service at `base_url`.
    ///
    /// `timeout` bounds every request this client makes; on expiry the call
    /// fails like any other transport error and the saga aborts.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpOrdersClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    fn trace_headers(context: &SpanContext) -> HeaderMap {
        let mut headers = HeaderMap::new();
        trace::inject(context, &mut headers);
        headers
    }

    /// Turn a non-success response into `ClientError::Status`, truncating
    /// the body for logs.
    async fn check<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect::<String>();
        tracing::warn!(status = %status, body = %body, "orders service returned non-success");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersClient {
    async fn create_order(
        &self,
        order: NewOrder,
        context: &SpanContext,
    ) -> Result<Order, ClientError> {
        let url = format!("{}/order", self.inner.base_url);
        tracing::debug!(%url, customer_id = %order.customer_id, "creating order remotely");

        let response = self
            .inner
            .client
            .post(&url)
            .headers(Self::trace_headers(context))
            .json(&order)
            .send()
            .await?;

        Self::check(response).await
    }

    async fn orders_for_customer(
        &self,
        customer_id: &UserId,
        context: &SpanContext,
    ) -> Result<Vec<Order>, ClientError> {
        let url = format!("{}/orders", self.inner.base_url);

        let response = self
            .inner
            .client
            .get(&url)
            .query(&[("uid", customer_id.as_str())])
            .headers(Self::trace_headers(context))
            .send()
            .await?;

        Self::check(response).await
    }

    async fn delete_for_customer(
        &self,
        customer_id: &UserId,
        context: &SpanContext,
    ) -> Result<DeleteReport, ClientError> {
        let url = format!("{}/orders", self.inner.base_url);
        tracing::debug!(%url, customer_id = %customer_id, "deleting orders remotely");

        let response = self
            .inner
            .client
            .delete(&url)
            .query(&[("uid", customer_id.as_str())])
            .headers(Self::trace_headers(context))
            .send()
            .await?;

        Self::check(response).await
    }
}
