//! Link-state snapshots and the parameters sent with each poll.
//!
//! The poll endpoint answers with a JSON document:
//!
//! ```text
//! {
//!   "host": "node-a",
//!   "link": "UP",
//!   "link_state": {
//!     "outbound": "...",
//!     "user_flags": {"STOP":false,"VALD":true,"FULL":false},
//!     "inbound": "\u0008\u0081h...",
//!     "link_flags": {"RECV":true,"SEND":true,"VALD":false,"FULL":true},
//!     "seq": 4711
//!   }
//! }
//! ```
//!
//! `link_flags` belong to the far side, `user_flags` echo our own. Payload
//! strings carry one octet per char. Only the fields the handshake needs are
//! extracted; everything else in the document is ignored.

use bytes::Bytes;
use serde::Deserialize;

use super::flags::{LocalFlags, RemoteFlags};
use crate::error::{LinkError, Result};
use crate::status::LinkStatus;

/// Remote-reported link state for one round. Replaced wholesale every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSnapshot {
    /// Far side's handshake flags.
    pub remote: RemoteFlags,
    /// Link sequence counter (wraps).
    pub sequence: u32,
    /// Coarse link health.
    pub status: LinkStatus,
    /// Reporting host, when the server names itself.
    pub host: Option<String>,
    /// Raw inbound payload octets, when present.
    pub inbound: Option<Bytes>,
    /// The server's echo of our own flags.
    pub reported_local: LocalFlags,
}

impl LinkSnapshot {
    /// Parse a poll response body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let doc: PollDocument = serde_json::from_slice(body)?;
        doc.try_into()
    }

    /// Build a snapshot from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let doc: PollDocument = serde_json::from_value(value)?;
        doc.try_into()
    }
}

#[derive(Debug, Deserialize)]
struct PollDocument {
    #[serde(default)]
    host: Option<serde_json::Value>,
    #[serde(default)]
    link: Option<serde_json::Value>,
    #[serde(default)]
    link_state: Option<LinkStateDocument>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkStateDocument {
    seq: u32,
    #[serde(default)]
    link_flags: FlagsDocument,
    #[serde(default)]
    user_flags: FlagsDocument,
    #[serde(default)]
    inbound: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FlagsDocument {
    #[serde(rename = "VALID", alias = "VALD", default)]
    valid: bool,
    #[serde(rename = "FULL", default)]
    full: bool,
}

impl TryFrom<PollDocument> for LinkSnapshot {
    type Error = LinkError;

    fn try_from(doc: PollDocument) -> Result<Self> {
        let state = doc.link_state.ok_or_else(|| {
            LinkError::InvalidSnapshot(match doc.error {
                Some(reason) => format!("server reported: {}", reason),
                None => "missing link_state".to_string(),
            })
        })?;

        let status = doc
            .link
            .as_ref()
            .and_then(|v| v.as_str())
            .map(LinkStatus::from_wire)
            .unwrap_or_default();

        let host = doc
            .host
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(LinkSnapshot {
            remote: RemoteFlags {
                valid: state.link_flags.valid,
                full: state.link_flags.full,
            },
            sequence: state.seq,
            status,
            host,
            inbound: state.inbound.as_deref().map(octets_from_str),
            reported_local: LocalFlags {
                valid: state.user_flags.valid,
                full: state.user_flags.full,
            },
        })
    }
}

/// Parameters sent with a poll request: this endpoint's flags and, while
/// the outbound offer stands, the encoded frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundParams {
    /// Inbound acknowledgment (`FULL`).
    pub full: bool,
    /// Outbound offer (`VALD`).
    pub valid: bool,
    /// Encoded frame octets; present only when `valid`.
    pub data: Option<Bytes>,
}

impl OutboundParams {
    /// Render as query-string pairs in the form the link server expects.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("FULL", self.full.to_string()),
            ("VALD", self.valid.to_string()),
        ];
        if self.valid {
            if let Some(data) = &self.data {
                pairs.push(("DATA", octets_to_hex(data)));
            }
        }
        pairs
    }
}

/// Convert a JSON payload string to octets, one per char.
///
/// Chars above U+00FF keep only their low byte.
pub fn octets_from_str(s: &str) -> Bytes {
    s.chars().map(|c| c as u32 as u8).collect::<Vec<u8>>().into()
}

/// Uppercase hex, two digits per octet.
pub fn octets_to_hex(octets: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(octets.len() * 2);
    for &b in octets {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0F) as usize] as char);
    }
    out
}
