//! Pure per-round state transition.
//!
//! Both directions are evaluated from one consistent snapshot. Each may take
//! at most one step per round, and the step depends only on that direction's
//! [`FlagPair`](crate::protocol::FlagPair):
//!
//! ```text
//! outbound (local.valid, remote.full)      inbound (remote.valid, local.full)
//!   (0,0) + queued unit -> Offer   valid=1   (1,0) -> Accept   full=1
//!   (1,1)               -> Complete valid=0  (0,1) -> Release  full=0
//!   otherwise           -> wait              otherwise -> wait
//! ```
//!
//! A step's result is stable against the same snapshot, so re-running a
//! round without any remote transition changes nothing.

use crate::protocol::{FlagPair, LocalFlags, Phase, RemoteFlags};

/// What the outbound direction does this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundEffect {
    /// Nothing to do.
    None,
    /// Place the head unit on offer.
    Offer,
    /// Far side took the offer; retire the head unit.
    Complete,
}

/// What the inbound direction does this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEffect {
    /// Nothing to do.
    None,
    /// Take the far side's offer and acknowledge it.
    Accept,
    /// Far side withdrew its offer; clear the acknowledgment.
    Release,
}

/// Result of [`next_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Local flags after this round.
    pub local: LocalFlags,
    /// Outbound step.
    pub outbound: OutboundEffect,
    /// Inbound step.
    pub inbound: InboundEffect,
}

impl Transition {
    /// Check if neither direction moved.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.outbound == OutboundEffect::None && self.inbound == InboundEffect::None
    }
}

/// Compute the next local flags and the queue effects for one round.
pub fn next_state(local: LocalFlags, remote: RemoteFlags, has_outbound: bool) -> Transition {
    let mut next = local;

    let outbound = match FlagPair::outbound(local, remote).phase() {
        Phase::Idle if has_outbound => {
            next.valid = true;
            OutboundEffect::Offer
        }
        Phase::Acknowledged => {
            next.valid = false;
            OutboundEffect::Complete
        }
        _ => OutboundEffect::None,
    };

    let inbound = match FlagPair::inbound(local, remote).phase() {
        Phase::Offered => {
            next.full = true;
            InboundEffect::Accept
        }
        Phase::Withdrawn => {
            next.full = false;
            InboundEffect::Release
        }
        _ => InboundEffect::None,
    };

    Transition {
        local: next,
        outbound,
        inbound,
    }
}
