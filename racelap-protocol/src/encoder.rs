//! Outgoing frame encoding
//!
//! [`ResponseEncoder`] writes a frame header, streams payload values through
//! the checksum, then appends the trailer. The checksum starts after the
//! device-id byte and covers LENGTH, COMMAND and PAYLOAD, the same scope the
//! parser checks, so every reply is itself a valid frame.

use crate::codec::{ByteSink, EncodeError};
use crate::port::{Direction, MAX_PAYLOAD_SIZE, SYNC_DOLLAR, SYNC_M};

/// Largest encoded frame: 6 header bytes + payload + checksum
pub const MAX_FRAME_SIZE: usize = 6 + MAX_PAYLOAD_SIZE + 1;

/// XOR checksum of a frame body
pub fn frame_checksum(length: u8, command: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length ^ command, |acc, &b| acc ^ b)
}

/// Streaming writer for one outgoing frame
#[derive(Debug)]
pub struct ResponseEncoder<'a, S: ByteSink> {
    sink: &'a mut S,
    checksum: u8,
    remaining: u8,
}

impl<'a, S: ByteSink> ResponseEncoder<'a, S> {
    /// Write the header and prepare to stream `length` payload bytes.
    pub fn begin(
        sink: &'a mut S,
        direction: Direction,
        device_id: u8,
        length: u8,
        command: u8,
    ) -> Result<Self, EncodeError> {
        if length as usize > MAX_PAYLOAD_SIZE {
            return Err(EncodeError::PayloadTooLarge);
        }

        sink.write_u8(SYNC_DOLLAR)?;
        sink.write_u8(SYNC_M)?;
        sink.write_u8(direction.marker())?;
        sink.write_u8(device_id)?;

        let mut encoder = Self {
            sink,
            checksum: 0,
            remaining: 0,
        };
        encoder.put(length)?;
        encoder.put(command)?;
        encoder.remaining = length;
        Ok(encoder)
    }

    /// Success reply header
    pub fn reply(
        sink: &'a mut S,
        device_id: u8,
        length: u8,
        command: u8,
    ) -> Result<Self, EncodeError> {
        Self::begin(sink, Direction::Response, device_id, length, command)
    }

    /// Error reply header; error replies carry no payload
    pub fn error(sink: &'a mut S, device_id: u8, command: u8) -> Result<Self, EncodeError> {
        Self::begin(sink, Direction::Error, device_id, 0, command)
    }

    fn put(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.sink.write_u8(byte)?;
        self.checksum ^= byte;
        Ok(())
    }

    /// Payload bytes still owed
    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Append the checksum; fails if fewer payload bytes were written than declared.
    pub fn finish(self) -> Result<(), EncodeError> {
        if self.remaining != 0 {
            return Err(EncodeError::PayloadUnderrun);
        }
        self.sink.write_u8(self.checksum)
    }
}

/// Payload bytes, counted against the declared length.
impl<S: ByteSink> ByteSink for ResponseEncoder<'_, S> {
    fn write_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        if self.remaining == 0 {
            return Err(EncodeError::PayloadOverrun);
        }
        self.put(byte)?;
        self.remaining -= 1;
        Ok(())
    }
}

/// Encode a complete frame in one call.
pub fn encode_frame<S: ByteSink>(
    sink: &mut S,
    direction: Direction,
    device_id: u8,
    command: u8,
    payload: &[u8],
) -> Result<(), EncodeError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(EncodeError::PayloadTooLarge);
    }
    let length = payload.len() as u8;
    let mut encoder = ResponseEncoder::begin(sink, direction, device_id, length, command)?;
    encoder.write_all(payload)?;
    encoder.finish()
}
