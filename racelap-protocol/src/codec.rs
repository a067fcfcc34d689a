//! Little-endian byte sinks and sources.
//!
//! Multi-byte values are little-endian. A 32-bit value is written as two
//! 16-bit halves, low half first, which yields the same bytes as
//! `u32::to_le_bytes`.

use heapless::Vec;

/// Errors while writing bytes out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The sink has no room for another byte
    BufferFull,
    /// Declared payload length exceeds [`crate::MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// More payload bytes written than declared in the header
    PayloadOverrun,
    /// Fewer payload bytes written than declared in the header
    PayloadUnderrun,
}

/// Errors while reading bytes in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Not enough bytes left
    Truncated,
}

/// Destination for encoded bytes
pub trait ByteSink {
    /// Append one byte
    fn write_u8(&mut self, byte: u8) -> Result<(), EncodeError>;

    /// Append a 16-bit value, little-endian
    fn write_u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.write_u8(value as u8)?;
        self.write_u8((value >> 8) as u8)
    }

    /// Append a 32-bit value as two little-endian halves, low half first
    fn write_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.write_u16(value as u16)?;
        self.write_u16((value >> 16) as u16)
    }

    /// Append every byte of `bytes`
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        for &byte in bytes {
            self.write_u8(byte)?;
        }
        Ok(())
    }
}

/// Source of bytes to decode
pub trait ByteSource {
    /// Take the next byte
    fn read_u8(&mut self) -> Result<u8, DecodeError>;

    /// Take a little-endian 16-bit value
    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let low = self.read_u8()? as u16;
        let high = self.read_u8()? as u16;
        Ok(low | (high << 8))
    }

    /// Take a 32-bit value stored as two little-endian halves
    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let low = self.read_u16()? as u32;
        let high = self.read_u16()? as u32;
        Ok(low | (high << 16))
    }
}

impl<const N: usize> ByteSink for Vec<u8, N> {
    fn write_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.push(byte).map_err(|_| EncodeError::BufferFull)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        (**self).write_u8(byte)
    }
}

/// [`ByteSink`] over a caller-provided slice
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    /// Start writing at the beginning of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// The bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl ByteSink for SliceWriter<'_> {
    fn write_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        let slot = self.buf.get_mut(self.pos).ok_or(EncodeError::BufferFull)?;
        *slot = byte;
        self.pos += 1;
        Ok(())
    }
}

/// [`ByteSource`] over a borrowed slice
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Start reading at the beginning of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not read yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl ByteSource for SliceReader<'_> {
    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.data.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }
}
