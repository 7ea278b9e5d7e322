//! Handshake engine: applies one [`Transition`] per round to the local flags
//! and the transfer queues.

use bytes::Bytes;

use super::transition::{next_state, InboundEffect, OutboundEffect, Transition};
use crate::protocol::{check, Frame, LinkSnapshot, LocalFlags, OutboundParams};
use crate::queue::{InboundBuffer, OutboundQueue};

/// What one application of the engine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The computed transition.
    pub transition: Transition,
    /// Unit placed on offer this round.
    pub offered: Option<Frame>,
    /// Unit retired this round (delivered exactly once).
    pub completed: Option<Frame>,
    /// Payload appended to the inbound buffer this round.
    pub delivered: Option<Bytes>,
    /// An inbound offer was acknowledged but its frame was unusable.
    pub malformed: bool,
}

/// Owns the local flags, the pending offer, and both transfer queues.
#[derive(Debug, Default)]
pub struct HandshakeEngine {
    local: LocalFlags,
    pending: Option<Frame>,
    outbound: OutboundQueue,
    inbound: InboundBuffer,
}

impl HandshakeEngine {
    /// Create an idle engine with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters to send with the next poll.
    pub fn outbound_params(&self) -> OutboundParams {
        OutboundParams {
            full: self.local.full,
            valid: self.local.valid,
            data: if self.local.valid {
                self.pending.as_ref().map(Frame::to_bytes)
            } else {
                None
            },
        }
    }

    /// Apply the handshake rules to one snapshot.
    pub fn apply(&mut self, snapshot: &LinkSnapshot) -> Applied {
        let transition = next_state(self.local, snapshot.remote, !self.outbound.is_empty());
        let mut applied = Applied {
            transition,
            offered: None,
            completed: None,
            delivered: None,
            malformed: false,
        };

        match transition.outbound {
            OutboundEffect::Offer => {
                self.pending = self.outbound.front().cloned();
                applied.offered = self.pending.clone();
                tracing::debug!(
                    "Offering unit of {} octets",
                    self.pending.as_ref().map_or(0, Frame::payload_len)
                );
            }
            OutboundEffect::Complete => {
                self.pending = None;
                applied.completed = self.outbound.pop_front();
                tracing::debug!(
                    "Far side took unit of {} octets, {} left",
                    applied.completed.as_ref().map_or(0, Frame::payload_len),
                    self.outbound.len()
                );
            }
            OutboundEffect::None => {}
        }

        match transition.inbound {
            InboundEffect::Accept => {
                // acknowledge regardless, so the far side is never left waiting
                match snapshot.inbound.as_deref().map(check) {
                    Some(Ok(payload)) => {
                        tracing::debug!("Accepted unit of {} octets", payload.len());
                        self.inbound.append(&payload);
                        applied.delivered = Some(payload);
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Discarding inbound payload: {}", e);
                        applied.malformed = true;
                    }
                    None => {
                        tracing::warn!("Far side offered data but snapshot carries no payload");
                        applied.malformed = true;
                    }
                }
            }
            InboundEffect::Release => {
                tracing::debug!("Far side withdrew its offer");
            }
            InboundEffect::None => {}
        }

        self.local = transition.local;
        applied
    }

    /// Current local flags.
    #[inline]
    pub fn local_flags(&self) -> LocalFlags {
        self.local
    }

    /// Unit currently on offer.
    pub fn pending(&self) -> Option<&Frame> {
        self.pending.as_ref()
    }

    /// Outbound queue.
    pub fn outbound(&self) -> &OutboundQueue {
        &self.outbound
    }

    /// Outbound queue, for enqueuing.
    pub fn outbound_mut(&mut self) -> &mut OutboundQueue {
        &mut self.outbound
    }

    /// Inbound buffer.
    pub fn inbound(&self) -> &InboundBuffer {
        &self.inbound
    }

    /// Inbound buffer, for draining.
    pub fn inbound_mut(&mut self) -> &mut InboundBuffer {
        &mut self.inbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode, RemoteFlags};
    use crate::status::LinkStatus;

    fn snapshot(remote_valid: bool, remote_full: bool, inbound: Option<&[u8]>) -> LinkSnapshot {
        LinkSnapshot {
            remote: RemoteFlags {
                valid: remote_valid,
                full: remote_full,
            },
            sequence: 0,
            status: LinkStatus::Up,
            host: None,
            inbound: inbound.map(Bytes::copy_from_slice),
            reported_local: LocalFlags::default(),
        }
    }

    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        encode(payload).unwrap().to_bytes().to_vec()
    }

    #[test]
    fn test_offer_then_complete() {
        let mut engine = HandshakeEngine::new();
        engine.outbound_mut().push(b"h").unwrap();

        // round 1: idle link, unit queued
        let applied = engine.apply(&snapshot(false, false, None));
        assert_eq!(applied.transition.outbound, OutboundEffect::Offer);
        assert!(engine.local_flags().valid);
        assert_eq!(engine.pending().unwrap().payload(), b"h");
        assert_eq!(engine.outbound().len(), 1);

        let params = engine.outbound_params();
        assert!(params.valid);
        assert_eq!(params.data.as_deref(), Some(&[0x08, 0x81, b'h'][..]));

        // round 2: far side acknowledged
        let applied = engine.apply(&snapshot(false, true, None));
        assert_eq!(applied.transition.outbound, OutboundEffect::Complete);
        assert_eq!(applied.completed.unwrap().payload(), b"h");
        assert!(!engine.local_flags().valid);
        assert!(engine.pending().is_none());
        assert!(engine.outbound().is_empty());
        assert_eq!(engine.outbound_params(), OutboundParams::default());
    }

    #[test]
    fn test_unit_stays_queued_until_ack() {
        let mut engine = HandshakeEngine::new();
        engine.outbound_mut().push(b"x").unwrap();
        engine.apply(&snapshot(false, false, None));

        for _ in 0..5 {
            let applied = engine.apply(&snapshot(false, false, None));
            assert!(applied.transition.is_noop());
            assert_eq!(engine.outbound().len(), 1);
        }
    }

    #[test]
    fn test_inbound_accept_appends_once() {
        let mut engine = HandshakeEngine::new();
        let raw = frame_bytes(b"hi");

        let applied = engine.apply(&snapshot(true, false, Some(&raw)));
        assert_eq!(applied.transition.inbound, InboundEffect::Accept);
        assert_eq!(applied.delivered.as_deref(), Some(&b"hi"[..]));
        assert!(engine.local_flags().full);

        // same offer observed again: no duplicate
        let applied = engine.apply(&snapshot(true, false, Some(&raw)));
        assert!(applied.transition.is_noop());
        assert_eq!(engine.inbound().peek().as_ref(), b"hi");

        let applied = engine.apply(&snapshot(false, false, None));
        assert_eq!(applied.transition.inbound, InboundEffect::Release);
        assert!(!engine.local_flags().full);
        assert_eq!(engine.inbound().units_delivered(), 1);
    }

    #[test]
    fn test_malformed_inbound_still_acknowledged() {
        let mut engine = HandshakeEngine::new();

        let applied = engine.apply(&snapshot(true, false, Some(&[0x07, 0x81, b'z'])));
        assert_eq!(applied.transition.inbound, InboundEffect::Accept);
        assert!(applied.malformed);
        assert!(applied.delivered.is_none());
        assert!(engine.local_flags().full);
        assert!(engine.inbound().is_empty());
        assert!(engine.outbound_params().full);
    }

    #[test]
    fn test_missing_inbound_payload_still_acknowledged() {
        let mut engine = HandshakeEngine::new();
        let applied = engine.apply(&snapshot(true, false, None));
        assert!(applied.malformed);
        assert!(engine.local_flags().full);
    }

    #[test]
    fn test_unchanged_snapshot_mutates_nothing() {
        let mut engine = HandshakeEngine::new();
        engine.outbound_mut().push(b"q").unwrap();
        let snap = snapshot(true, false, Some(&frame_bytes(b"r")));

        engine.apply(&snap);
        let flags = engine.local_flags();
        let pending = engine.pending().cloned();
        let queued = engine.outbound().len();
        let inbound = engine.inbound().peek();

        let applied = engine.apply(&snap);
        assert!(applied.transition.is_noop());
        assert_eq!(engine.local_flags(), flags);
        assert_eq!(engine.pending().cloned(), pending);
        assert_eq!(engine.outbound().len(), queued);
        assert_eq!(engine.inbound().peek(), inbound);
    }

    #[test]
    fn test_fifo_order_across_transfers() {
        let mut engine = HandshakeEngine::new();
        engine.outbound_mut().push(b"1").unwrap();
        engine.outbound_mut().push(b"2").unwrap();

        let mut sent = Vec::new();
        for _ in 0..2 {
            engine.apply(&snapshot(false, false, None)); // offer
            let applied = engine.apply(&snapshot(false, true, None)); // ack
            sent.push(applied.completed.unwrap().payload().to_vec());
            engine.apply(&snapshot(false, false, None)); // far side clears full
        }
        assert_eq!(sent, vec![b"1".to_vec(), b"2".to_vec()]);
    }
}
