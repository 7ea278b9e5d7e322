//! Handshake flag registers.
//!
//! Each endpoint owns two bits: `valid` (its outbound offer is in place) and
//! `full` (it has taken the far side's offer and awaits clearance). The far
//! side's bits are only ever read. Pairing one bit from each side gives the
//! state of one direction:
//!
//! ```text
//! outbound: (local.valid,  remote.full)
//! inbound:  (remote.valid, local.full)
//! ```
//!
//! The two directions share no bit, so their handshakes cannot corrupt each
//! other.

/// This endpoint's own flags. Only the handshake engine writes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFlags {
    /// Outbound offer asserted.
    pub valid: bool,
    /// Inbound offer consumed, awaiting the far side's withdrawal.
    pub full: bool,
}

/// The far side's flags as reported in the latest snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteFlags {
    /// Far side has data on offer for us.
    pub valid: bool,
    /// Far side has consumed our offer.
    pub full: bool,
}

/// The (valid, full) pair of a single direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagPair {
    /// Offering side's bit.
    pub valid: bool,
    /// Receiving side's bit.
    pub full: bool,
}

impl FlagPair {
    /// Pair for data leaving this endpoint.
    #[inline]
    pub fn outbound(local: LocalFlags, remote: RemoteFlags) -> Self {
        Self {
            valid: local.valid,
            full: remote.full,
        }
    }

    /// Pair for data arriving at this endpoint.
    #[inline]
    pub fn inbound(local: LocalFlags, remote: RemoteFlags) -> Self {
        Self {
            valid: remote.valid,
            full: local.full,
        }
    }

    /// Phase of the four-phase handshake this pair encodes.
    pub fn phase(self) -> Phase {
        match (self.valid, self.full) {
            (false, false) => Phase::Idle,
            (true, false) => Phase::Offered,
            (true, true) => Phase::Acknowledged,
            (false, true) => Phase::Withdrawn,
        }
    }
}

/// Handshake phase derived from a [`FlagPair`]; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing on offer.
    Idle,
    /// Offer placed, not yet taken.
    Offered,
    /// Offer taken; the offerer must withdraw.
    Acknowledged,
    /// Offer withdrawn; the receiver must clear its acknowledgment.
    Withdrawn,
}
