//! Transport module - how a poll round reaches the link.
//!
//! The handshake only needs flags, the sequence counter, the status string,
//! and the inbound payload. Any transport that can produce a
//! [`LinkSnapshot`] from [`OutboundParams`] can drive it:
//! - [`HttpTransport`] - `GET <endpoint><path>?FULL=..&VALD=..&DATA=..`

mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{LinkSnapshot, OutboundParams};

pub use http::{HttpTransport, DEFAULT_ENDPOINT, DEFAULT_PATH, DEFAULT_REQUEST_TIMEOUT};

/// One request/response exchange with the link.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send this endpoint's flags (and offer) and return the link state.
    async fn poll(&self, params: &OutboundParams) -> Result<LinkSnapshot>;
}
