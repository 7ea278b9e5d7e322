//! Client builder and poll round.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the poll
//! endpoint. The [`LinkClient`] runs one round at a time:
//! 1. Compute outbound parameters from the local flags and pending offer
//! 2. Poll the link
//! 3. Apply the handshake rules to the snapshot
//! 4. Update link status and sequence
//!
//! A round never fails outward: transport and parse errors are logged and
//! the round becomes a no-op.
//!
//! # Example
//!
//! ```ignore
//! use ait_link_client::LinkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LinkClient::builder()
//!         .endpoint("http://10.0.0.2")
//!         .build()?;
//!
//!     client.enqueue_chunked(b"hello")?;
//!     loop {
//!         client.round().await;
//!         print!("{}", String::from_utf8_lossy(&client.drain_inbound()));
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::Result;
use crate::handshake::{Applied, HandshakeEngine, InboundEffect, OutboundEffect};
use crate::protocol::{LinkSnapshot, LocalFlags, RemoteFlags, MAX_PAYLOAD_LEN};
use crate::status::{LinkStatus, StatusTracker};
use crate::transport::{
    HttpTransport, Transport, DEFAULT_ENDPOINT, DEFAULT_PATH, DEFAULT_REQUEST_TIMEOUT,
};

/// Default unit size for chunked sends: the link's 44-octet payload buffer
/// minus the 2-octet frame header.
pub const DEFAULT_MAX_UNIT_LEN: usize = 42;

/// Builder for configuring and creating a link client.
pub struct ClientBuilder {
    endpoint: String,
    path: String,
    request_timeout: Duration,
    max_unit_len: usize,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            path: DEFAULT_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_unit_len: DEFAULT_MAX_UNIT_LEN,
        }
    }

    /// Set the server base URL.
    ///
    /// Default: `http://127.0.0.1`
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Set the link-state document path.
    ///
    /// Default: `/link_map/link.json`
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set the per-request timeout.
    ///
    /// Default: 5 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the unit size used by [`LinkClient::enqueue_chunked`].
    ///
    /// Clamped to `1..=127`.
    /// Default: 42
    pub fn max_unit_len(mut self, len: usize) -> Self {
        let clamped = len.clamp(1, MAX_PAYLOAD_LEN);
        if clamped != len {
            tracing::warn!("max_unit_len {} out of range, using {}", len, clamped);
        }
        self.max_unit_len = clamped;
        self
    }

    /// Build a client polling over HTTP.
    pub fn build(self) -> Result<LinkClient<HttpTransport>> {
        let transport = HttpTransport::new(&self.endpoint, &self.path, self.request_timeout)?;
        Ok(self.build_with(transport))
    }

    /// Build a client on a caller-supplied transport.
    pub fn build_with<T: Transport>(self, transport: T) -> LinkClient<T> {
        LinkClient {
            transport: Arc::new(transport),
            state: Arc::new(Mutex::new(LinkState::default())),
            max_unit_len: self.max_unit_len,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Snapshot received and applied.
    Completed,
    /// Poll failed; nothing changed.
    TransportFailed,
}

/// Summary of one round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    /// How the round ended.
    pub outcome: RoundOutcome,
    /// Outbound step taken.
    pub outbound: OutboundEffect,
    /// Inbound step taken.
    pub inbound: InboundEffect,
    /// Octets delivered to the inbound buffer.
    pub delivered: Option<Bytes>,
    /// Link status changed this round.
    pub status_changed: bool,
    /// Sequence counter after the round.
    pub sequence: u32,
}

impl RoundReport {
    fn failed(sequence: u32) -> Self {
        Self {
            outcome: RoundOutcome::TransportFailed,
            outbound: OutboundEffect::None,
            inbound: InboundEffect::None,
            delivered: None,
            status_changed: false,
            sequence,
        }
    }
}

#[derive(Debug, Default)]
struct LinkState {
    engine: HandshakeEngine,
    status: StatusTracker,
    remote: RemoteFlags,
    sequence: u32,
}

/// A link endpoint: one source and one sink handshake over a polled link.
///
/// Cheap to clone; clones share state. The application enqueues and drains
/// through any clone while a scheduler drives [`round`](Self::round).
pub struct LinkClient<T> {
    transport: Arc<T>,
    state: Arc<Mutex<LinkState>>,
    max_unit_len: usize,
}

impl<T> Clone for LinkClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            state: self.state.clone(),
            max_unit_len: self.max_unit_len,
        }
    }
}

impl LinkClient<HttpTransport> {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> LinkClient<T> {
    /// Create a client with default settings on `transport`.
    pub fn new(transport: T) -> Self {
        ClientBuilder::new().build_with(transport)
    }

    /// Run one poll round.
    ///
    /// Callers must not run rounds concurrently on clones of the same client;
    /// [`PollScheduler`](crate::scheduler::PollScheduler) enforces this.
    pub async fn round(&self) -> RoundReport {
        let params = self.state.lock().engine.outbound_params();

        let snapshot = match self.transport.poll(&params).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Poll round failed: {}", e);
                return RoundReport::failed(self.current_sequence());
            }
        };

        let mut state = self.state.lock();
        let applied = state.engine.apply(&snapshot);
        let status_changed = state
            .status
            .update(snapshot.status, snapshot.host.as_deref());
        state.remote = snapshot.remote;
        state.sequence = snapshot.sequence;
        log_round(&snapshot, &applied);

        RoundReport {
            outcome: RoundOutcome::Completed,
            outbound: applied.transition.outbound,
            inbound: applied.transition.inbound,
            delivered: applied.delivered,
            status_changed,
            sequence: snapshot.sequence,
        }
    }

    /// Queue one unit for transfer. Fails with `PayloadTooLarge` above 127
    /// octets; an empty unit is ignored.
    pub fn enqueue_outbound(&self, bytes: &[u8]) -> Result<()> {
        self.state.lock().engine.outbound_mut().push(bytes)
    }

    /// Split `bytes` into units of the configured size and queue them in
    /// order. Returns the number of units queued.
    pub fn enqueue_chunked(&self, bytes: &[u8]) -> Result<usize> {
        self.state
            .lock()
            .engine
            .outbound_mut()
            .push_chunked(bytes, self.max_unit_len)
    }

    /// Everything delivered and not yet drained, left in place.
    pub fn peek_inbound(&self) -> Bytes {
        self.state.lock().engine.inbound().peek()
    }

    /// Take everything delivered so far.
    pub fn drain_inbound(&self) -> Bytes {
        self.state.lock().engine.inbound_mut().drain()
    }

    /// Latest link status.
    pub fn current_status(&self) -> LinkStatus {
        self.state.lock().status.current()
    }

    /// Latest link sequence counter.
    pub fn current_sequence(&self) -> u32 {
        self.state.lock().sequence
    }

    /// Latest reported host.
    pub fn host(&self) -> Option<String> {
        self.state.lock().status.host().map(str::to_string)
    }

    /// This endpoint's flags.
    pub fn local_flags(&self) -> LocalFlags {
        self.state.lock().engine.local_flags()
    }

    /// Far side's flags from the latest snapshot.
    pub fn remote_flags(&self) -> RemoteFlags {
        self.state.lock().remote
    }

    /// Units still waiting to be taken by the far side.
    pub fn outbound_len(&self) -> usize {
        self.state.lock().engine.outbound().len()
    }

    /// Configured chunk size.
    pub fn max_unit_len(&self) -> usize {
        self.max_unit_len
    }
}

fn log_round(snapshot: &LinkSnapshot, applied: &Applied) {
    if applied.transition.is_noop() {
        tracing::trace!(seq = snapshot.sequence, "Round settled, no transition");
    } else {
        tracing::debug!(
            seq = snapshot.sequence,
            outbound = ?applied.transition.outbound,
            inbound = ?applied.transition.inbound,
            "Round applied"
        );
    }
}
