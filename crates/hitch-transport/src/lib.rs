//! Synchronous HTTP transport boundary for the hitch reconciliation engine.
//!
//! The engine consumes a single abstract operation: send one request, receive
//! status and body. Everything below that line (connection handling, TLS,
//! proxies, timeouts) belongs to the transport implementation, not the engine.

pub mod http;

pub use http::HttpTransport;

use hitch_spec::Method;
use thiserror::Error;

/// What went wrong during an exchange, split by phase: the engine maps
/// `Connect` and `BodyRead` to distinct per-cycle outcomes.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failure: {0}")]
    Connect(String),
    #[error("failed to read response body: {0}")]
    BodyRead(String),
}

/// A fully-built request, ready to go on the wire.
///
/// Headers are ordered pairs; the engine hands them over already sorted so
/// identical specifications produce identical requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

/// A fully-read response. The body is consumed into memory before the
/// exchange returns, whatever the status was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

/// One synchronous HTTP exchange, no retries, no redirect games the caller
/// can't see. Implementations must return non-success statuses as a
/// [`WireResponse`], never as an error — status classification is the
/// engine's job.
pub trait Transport: Send + Sync {
    fn exchange(&self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}
