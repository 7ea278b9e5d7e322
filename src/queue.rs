//! Transfer queues.
//!
//! - [`OutboundQueue`] holds encoded units waiting to cross the link, FIFO.
//! - [`InboundBuffer`] accumulates delivered payload octets, append-only.
//!
//! The application feeds the outbound side and reads the inbound side; only
//! the handshake engine pops outbound units or appends inbound data.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::protocol::{encode, Frame};

/// FIFO of encoded units awaiting transfer.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    units: VecDeque<Frame>,
}

impl OutboundQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and append one unit.
    ///
    /// Fails with `PayloadTooLarge` before anything is queued. An empty
    /// payload is not a transferable unit and is skipped.
    pub fn push(&mut self, payload: &[u8]) -> Result<()> {
        let frame = encode(payload)?;
        if frame.payload_len() > 0 {
            self.units.push_back(frame);
        }
        Ok(())
    }

    /// Split `data` into units of at most `unit_len` octets and append them
    /// in order. Returns the number of units queued.
    pub fn push_chunked(&mut self, data: &[u8], unit_len: usize) -> Result<usize> {
        let unit_len = unit_len.max(1);
        // encode every chunk before queuing any, so a failure queues nothing
        let frames = data
            .chunks(unit_len)
            .map(encode)
            .collect::<Result<Vec<_>>>()?;
        let count = frames.len();
        self.units.extend(frames);
        Ok(count)
    }

    /// Unit at the head of the queue.
    #[inline]
    pub fn front(&self) -> Option<&Frame> {
        self.units.front()
    }

    pub(crate) fn pop_front(&mut self) -> Option<Frame> {
        self.units.pop_front()
    }

    /// Number of queued units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Append-only buffer of delivered octets.
#[derive(Debug, Default)]
pub struct InboundBuffer {
    data: BytesMut,
    units: u64,
}

impl InboundBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, payload: &[u8]) {
        self.data.extend_from_slice(payload);
        self.units += 1;
    }

    /// Copy of everything not yet drained.
    pub fn peek(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    /// Take everything not yet drained.
    pub fn drain(&mut self) -> Bytes {
        self.data.split().freeze()
    }

    /// Octets currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Units delivered since creation (not reset by draining).
    #[inline]
    pub fn units_delivered(&self) -> u64 {
        self.units
    }
}
