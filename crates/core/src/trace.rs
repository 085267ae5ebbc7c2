//! W3C Trace Context propagation for the cross-service saga.
//!
//! Every inbound request extracts a parent context from its headers, opens a
//! span, and injects the span's context into any outbound call, so the two or
//! three hops of the order lifecycle saga stay causally linked in the trace.
//! Follows the W3C Trace Context specification:
//! <https://www.w3.org/TR/trace-context/>
//!
//! ## Header format
//!
//! The `traceparent` header is `{version}-{trace_id}-{parent_id}-{flags}`:
//!
//! ```text
//! 00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01
//! ```
//!
//! - version: 2 hex chars (always "00" for the current spec)
//! - trace_id: 32 hex chars (16 bytes), all-zeros invalid
//! - parent_id: 16 hex chars (8 bytes, also called span_id), all-zeros invalid
//! - flags: 2 hex chars (1 byte, bit 0 = sampled)
//!
//! ## Span completion
//!
//! A [`Span`] is a scoped resource: dropping it finishes it. Handlers never
//! need a finish call on each exit path; early returns, `?` propagation, and
//! error branches all release the guard. Export to a collector is out of
//! scope here; finished spans are emitted as structured `tracing` events and
//! counted, which is what the services assert on.

use std::cell::Cell;
use std::fmt;
use std::time::Instant;

use http::{HeaderMap, HeaderValue};
use uuid::Uuid;

/// W3C Trace Context header name for trace propagation.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Trace flags bit indicating the trace is sampled.
pub const TRACE_FLAG_SAMPLED: u8 = 0x01;

thread_local! {
    /// Running count of spans finished on this thread.
    static FINISHED_SPANS: Cell<u64> = const { Cell::new(0) };
}

/// Number of spans finished on the current thread.
///
/// A span left unfinished is a correctness defect; tests use this hook to
/// assert that every span opened on a request path was finished exactly
/// once, regardless of which branch the request took. Per-thread so
/// concurrently running tests do not observe each other's spans.
pub fn finished_span_count() -> u64 {
    FINISHED_SPANS.with(Cell::get)
}

/// A span's identity and its position in the trace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    /// W3C trace ID (32 hex chars, 16 bytes).
    pub trace_id: String,
    /// Span ID (16 hex chars, 8 bytes).
    pub span_id: String,
    /// W3C trace flags (bit 0 = sampled).
    pub trace_flags: u8,
}

impl SpanContext {
    /// Start a new trace: random trace ID and span ID, sampled.
    #[must_use]
    pub fn new_root() -> Self {
        Self {
            trace_id: generate_trace_id(),
            span_id: generate_span_id(),
            trace_flags: TRACE_FLAG_SAMPLED,
        }
    }

    /// A child context: same trace ID, fresh span ID, inherited flags.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: generate_span_id(),
            trace_flags: self.trace_flags,
        }
    }

    /// Check whether the sampled flag is set.
    #[must_use]
    pub const fn is_sampled(&self) -> bool {
        self.trace_flags & TRACE_FLAG_SAMPLED != 0
    }

    /// Format as a W3C `traceparent` header value.
    #[must_use]
    pub fn to_traceparent(&self) -> String {
        format!(
            "00-{}-{}-{:02x}",
            self.trace_id, self.span_id, self.trace_flags
        )
    }

    /// Parse a `traceparent` header value. Returns `None` when malformed.
    #[must_use]
    pub fn parse(traceparent: &str) -> Option<Self> {
        let parts: Vec<&str> = traceparent.split('-').collect();
        if parts.len() < 4 {
            return None;
        }

        // Version must be a hex byte; version 00 has exactly four fields.
        // Future versions may carry more, which we ignore per spec.
        let version = parts[0];
        if version.len() != 2 || u8::from_str_radix(version, 16).is_err() {
            return None;
        }
        if version == "00" && parts.len() != 4 {
            return None;
        }

        let trace_id = parts[1];
        if !is_hex_of_len(trace_id, 32) || trace_id.bytes().all(|b| b == b'0') {
            return None;
        }

        let span_id = parts[2];
        if !is_hex_of_len(span_id, 16) || span_id.bytes().all(|b| b == b'0') {
            return None;
        }

        let trace_flags = u8::from_str_radix(parts[3], 16).ok()?;

        Some(Self {
            trace_id: trace_id.to_owned(),
            span_id: span_id.to_owned(),
            trace_flags,
        })
    }
}

impl fmt::Display for SpanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_traceparent())
    }
}

/// Extract a parent span context from inbound request headers.
///
/// Returns `None` when the `traceparent` header is absent or malformed; a
/// bad header never fails the request.
#[must_use]
pub fn extract(headers: &HeaderMap) -> Option<SpanContext> {
    let value = headers.get(TRACEPARENT_HEADER)?.to_str().ok()?;
    SpanContext::parse(value)
}

/// Inject a span context into outbound request headers.
///
/// Called on every outbound inter-service request, so the downstream
/// service's extracted parent is the current span.
pub fn inject(context: &SpanContext, headers: &mut HeaderMap) {
    if let Ok(value) = HeaderValue::from_str(&context.to_traceparent()) {
        headers.insert(TRACEPARENT_HEADER, value);
    }
}

/// A unit of traced work, finished exactly once when dropped.
///
/// Created as a child of the extracted parent when one exists, otherwise as
/// a new root. `set_error` tags the span before an error return.
#[derive(Debug)]
pub struct Span {
    operation: &'static str,
    context: SpanContext,
    started: Instant,
    error: Option<String>,
    finished: bool,
}

impl Span {
    /// Open a span for `operation`, child of `parent` when present.
    #[must_use]
    pub fn start(operation: &'static str, parent: Option<&SpanContext>) -> Self {
        let context = parent.map_or_else(SpanContext::new_root, SpanContext::child);
        tracing::debug!(
            operation,
            trace_id = %context.trace_id,
            span_id = %context.span_id,
            "span started"
        );
        Self {
            operation,
            context,
            started: Instant::now(),
            error: None,
            finished: false,
        }
    }

    /// The context to propagate to children and outbound carriers.
    #[must_use]
    pub fn context(&self) -> &SpanContext {
        &self.context
    }

    /// Tag the span as failed. The tag is reported when the span finishes.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Finish the span explicitly. Dropping the span has the same effect;
    /// either way the span finishes exactly once.
    pub fn finish(mut self) {
        self.finish_once();
    }

    fn finish_once(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        FINISHED_SPANS.with(|count| count.set(count.get() + 1));

        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match &self.error {
            Some(error) => tracing::warn!(
                operation = self.operation,
                trace_id = %self.context.trace_id,
                span_id = %self.context.span_id,
                elapsed_ms,
                error = %error,
                "span finished with error"
            ),
            None => tracing::debug!(
                operation = self.operation,
                trace_id = %self.context.trace_id,
                span_id = %self.context.span_id,
                elapsed_ms,
                "span finished"
            ),
        }
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        self.finish_once();
    }
}

/// Generate a random 32-character hex trace ID (16 bytes).
fn generate_trace_id() -> String {
    hex_encode(Uuid::new_v4().as_bytes())
}

/// Generate a random 16-character hex span ID (8 bytes).
fn generate_span_id() -> String {
    hex_encode(&Uuid::new_v4().as_bytes()[..8])
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}
