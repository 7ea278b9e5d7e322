//! Handshake module - the two four-phase handshakes (outbound and inbound).
//!
//! Provides:
//! - [`next_state`] - pure transition from (local, remote, queue non-empty)
//! - [`HandshakeEngine`] - applies a transition to flags and queues
//!
//! The flag pair is the state; nothing else about handshake progress is
//! stored, so there is no hidden state to fall out of step with the link.

mod engine;
mod transition;

pub use engine::{Applied, HandshakeEngine};
pub use transition::{next_state, InboundEffect, OutboundEffect, Transition};
