//! # ait-link-client
//!
//! Rust client for the AIT link handshake protocol.
//!
//! Two endpoints exchange small framed units over a shared link state that
//! each side reads and writes by polling a server. Transfers in each
//! direction use a four-phase handshake on a VALID/FULL flag pair, so a unit
//! is delivered exactly once and in order even though every round is a plain
//! request/response.
//!
//! ## Architecture
//!
//! - **Protocol**: frame codec (`0x08`, `0x80 + len`, payload) and the JSON
//!   link-state snapshot
//! - **Handshake**: pure transition function plus the engine that applies it
//!   to the outbound queue and inbound buffer
//! - **Scheduler**: rate-bounded, single-flight polling
//!
//! ## Example
//!
//! ```ignore
//! use ait_link_client::{LinkClient, PollRate, PollScheduler, SchedulerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LinkClient::builder()
//!         .endpoint("http://10.0.0.2")
//!         .build()?;
//!
//!     let config = SchedulerConfig::default().with_rate(PollRate::from_hz(10.0));
//!     let mut scheduler = PollScheduler::new(client.clone(), config);
//!     scheduler.start();
//!
//!     client.enqueue_chunked(b"hello")?;
//!     // ... later
//!     let received = client.drain_inbound();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handshake;
pub mod protocol;
pub mod queue;
pub mod scheduler;
pub mod status;
pub mod transport;

mod client;

pub use client::{
    ClientBuilder, LinkClient, RoundOutcome, RoundReport, DEFAULT_MAX_UNIT_LEN,
};
pub use error::LinkError;
pub use scheduler::{PollRate, PollScheduler, SchedulerConfig, SchedulerStats, Trigger};
pub use status::LinkStatus;
