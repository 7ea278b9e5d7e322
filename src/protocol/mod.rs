//! Protocol module - frame codec, handshake flags, and link snapshots.
//!
//! This module implements the link-side data model:
//! - 2-octet-header AIT frames (marker + biased length)
//! - Local/remote VALID/FULL flag registers
//! - JSON link-state snapshots and outbound poll parameters

mod flags;
mod frame;
mod snapshot;

pub use flags::{FlagPair, LocalFlags, Phase, RemoteFlags};
pub use frame::{
    check, decode, encode, Frame, FRAME_HEADER_SIZE, FRAME_MARKER, LENGTH_BIAS, MAX_PAYLOAD_LEN,
};
pub use snapshot::{octets_from_str, octets_to_hex, LinkSnapshot, OutboundParams};
