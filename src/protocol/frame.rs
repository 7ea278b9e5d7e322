//! AIT frame codec.
//!
//! One AIT unit travels as a tiny octet frame:
//! ```text
//! ┌────────┬──────────────┬──────────────────┐
//! │ Marker │ Length       │ Payload          │
//! │ 0x08   │ 0x80 + len   │ len octets       │
//! └────────┴──────────────┴──────────────────┘
//! ```
//!
//! The length octet carries 7 usable bits, so a unit holds at most 127
//! octets. A frame whose length octet is not strictly above `0x80` is not a
//! valid unit and decodes to `None`.
//!
//! # Example
//!
//! ```
//! use ait_link_client::protocol::{decode, encode};
//!
//! let frame = encode(b"h").unwrap();
//! assert_eq!(frame.to_bytes().as_ref(), &[0x08, 0x81, b'h']);
//! assert_eq!(decode(&frame.to_bytes()).as_deref(), Some(&b"h"[..]));
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LinkError, Result};

/// First octet of every frame ("raw octets" marker).
pub const FRAME_MARKER: u8 = 0x08;

/// Bias added to the payload length in the second octet.
pub const LENGTH_BIAS: u8 = 0x80;

/// Marker plus length octet.
pub const FRAME_HEADER_SIZE: usize = 2;

/// Largest payload the length octet can describe.
pub const MAX_PAYLOAD_LEN: usize = 127;

/// One encoded AIT unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Get a reference to the payload octets.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// The length octet as it appears on the wire.
    #[inline]
    pub fn length_byte(&self) -> u8 {
        LENGTH_BIAS + self.payload.len() as u8
    }

    /// Total size of this frame on the wire.
    #[inline]
    pub fn size(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }

    /// Serialize to the wire octet layout.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_u8(FRAME_MARKER);
        buf.put_u8(self.length_byte());
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

/// Encode one unit into a frame.
///
/// Fails with [`LinkError::PayloadTooLarge`] when `payload` is longer than
/// [`MAX_PAYLOAD_LEN`]; callers with more data must chunk it.
pub fn encode(payload: &[u8]) -> Result<Frame> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(LinkError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(Frame {
        payload: Bytes::copy_from_slice(payload),
    })
}

/// Decode the payload of a raw frame.
///
/// Returns `None` unless the marker is `0x08`, the length octet is above
/// `0x80`, and the buffer holds the whole payload. Trailing octets (the link
/// pads its payload buffer with NULs) are ignored.
pub fn decode(raw: &[u8]) -> Option<Bytes> {
    check(raw).ok()
}

/// Like [`decode`], but says why a frame was rejected.
pub fn check(raw: &[u8]) -> Result<Bytes> {
    if raw.len() < FRAME_HEADER_SIZE {
        return Err(LinkError::MalformedFrame(format!(
            "{} octets is shorter than a frame header",
            raw.len()
        )));
    }
    if raw[0] != FRAME_MARKER {
        return Err(LinkError::MalformedFrame(format!(
            "marker 0x{:02X}, expected 0x{:02X}",
            raw[0], FRAME_MARKER
        )));
    }
    if raw[1] <= LENGTH_BIAS {
        return Err(LinkError::MalformedFrame(format!(
            "length octet 0x{:02X} not above 0x{:02X}",
            raw[1], LENGTH_BIAS
        )));
    }
    let len = (raw[1] - LENGTH_BIAS) as usize;
    let end = FRAME_HEADER_SIZE + len;
    if raw.len() < end {
        return Err(LinkError::MalformedFrame(format!(
            "frame declares {} octets but only {} present",
            len,
            raw.len() - FRAME_HEADER_SIZE
        )));
    }
    Ok(Bytes::copy_from_slice(&raw[FRAME_HEADER_SIZE..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let frame = encode(b"abc").unwrap();
        assert_eq!(frame.payload(), b"abc");
        assert_eq!(frame.length_byte(), 0x83);
        assert_eq!(frame.size(), 5);
        assert_eq!(frame.to_bytes().as_ref(), &[0x08, 0x83, b'a', b'b', b'c']);
    }

    #[test]
    fn test_roundtrip_all_lengths() {
        for len in 1..=MAX_PAYLOAD_LEN {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let frame = encode(&payload).unwrap();
            assert_eq!(decode(&frame.to_bytes()).as_deref(), Some(&payload[..]));
        }
    }

    #[test]
    fn test_encode_max_length() {
        let payload = vec![0xFF; MAX_PAYLOAD_LEN];
        let frame = encode(&payload).unwrap();
        assert_eq!(frame.length_byte(), 0xFF);
    }

    #[test]
    fn test_encode_too_large() {
        let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];
        let result = encode(&payload);
        assert!(matches!(
            result,
            Err(LinkError::PayloadTooLarge { len: 128, max: 127 })
        ));
    }

    #[test]
    fn test_empty_payload_is_not_a_valid_unit() {
        let frame = encode(b"").unwrap();
        assert_eq!(frame.to_bytes().as_ref(), &[0x08, 0x80]);
        assert_eq!(decode(&frame.to_bytes()), None);
    }

    #[test]
    fn test_decode_wrong_marker() {
        assert_eq!(decode(&[0x09, 0x81, b'x']), None);
        assert!(matches!(
            check(&[0x09, 0x81, b'x']),
            Err(LinkError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_small_length_octet() {
        assert_eq!(decode(&[0x08, 0x05, b'x']), None);
        assert_eq!(decode(&[0x08, 0x80]), None);
    }

    #[test]
    fn test_decode_short_buffers() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[0x08]), None);
        // declares 3 octets, carries 1
        assert_eq!(decode(&[0x08, 0x83, b'x']), None);
    }

    #[test]
    fn test_decode_ignores_padding() {
        let mut raw = vec![0u8; 44];
        raw[0] = 0x08;
        raw[1] = 0x82;
        raw[2] = b'o';
        raw[3] = b'k';
        assert_eq!(decode(&raw).as_deref(), Some(&b"ok"[..]));
    }
}
