//! Per-transport parser state.
//!
//! A [`Port`] holds everything needed to assemble one frame from one serial
//! transport. It is plain data: the transitions live in [`crate::parser`],
//! and consumers read the finished frame through [`Port::frame`].

use crate::codec::{ByteSource, DecodeError};

/// Payload buffer capacity, and the largest LENGTH a frame may declare.
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// Device id that every device accepts.
pub const WILDCARD_DEVICE_ID: u8 = 0;

/// First sync byte
pub const SYNC_DOLLAR: u8 = b'$';
/// Second sync byte
pub const SYNC_M: u8 = b'M';

/// Direction marker of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// `<`: sent towards a device (queries and actions)
    Request,
    /// `>`: sent by a device (replies)
    Response,
    /// `!`: negative reply from a device
    Error,
}

impl Direction {
    /// Wire marker byte
    pub const fn marker(self) -> u8 {
        match self {
            Direction::Request => b'<',
            Direction::Response => b'>',
            Direction::Error => b'!',
        }
    }

    /// Parse a marker byte accepted by the frame parser.
    ///
    /// Error markers are never accepted on input.
    pub const fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Direction::Request),
            b'>' => Some(Direction::Response),
            _ => None,
        }
    }
}

/// Frame parser states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Waiting for `$`
    #[default]
    Idle,
    /// Got `$`, waiting for `M`
    FrameStart,
    /// Got `M`, waiting for the direction marker
    HeaderM,
    /// Got the direction, waiting for the target device id
    HeaderArrow,
    /// Got the device id, waiting for LENGTH
    HeaderDeviceId,
    /// Got LENGTH, waiting for COMMAND
    HeaderSize,
    /// Reading payload, then the checksum
    HeaderCmd,
    /// A checksum-valid frame is waiting to be consumed
    CommandReceived,
}

/// A completed frame borrowed from its [`Port`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame<'a> {
    /// Command code
    pub command: u8,
    /// Device id from the header
    pub target_id: u8,
    /// Direction marker
    pub direction: Direction,
    /// Payload bytes, exactly as received
    pub payload: &'a [u8],
}

impl Frame<'_> {
    /// Whether the header addresses every device
    pub fn is_wildcard(&self) -> bool {
        self.target_id == WILDCARD_DEVICE_ID
    }
}

/// Session state of one serial transport
#[derive(Debug, Clone)]
pub struct Port {
    pub(crate) state: ParseState,
    pub(crate) direction: Direction,
    pub(crate) target_id: u8,
    pub(crate) data_size: u8,
    pub(crate) checksum: u8,
    pub(crate) buffer: [u8; MAX_PAYLOAD_SIZE],
    pub(crate) offset: u8,
    pub(crate) read_index: u8,
    pub(crate) command: u8,
}

impl Default for Port {
    fn default() -> Self {
        Self::new()
    }
}

impl Port {
    /// Create an idle port
    pub const fn new() -> Self {
        Self {
            state: ParseState::Idle,
            direction: Direction::Request,
            target_id: 0,
            data_size: 0,
            checksum: 0,
            buffer: [0; MAX_PAYLOAD_SIZE],
            offset: 0,
            read_index: 0,
            command: 0,
        }
    }

    /// Current parser state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Whether a completed frame is waiting to be consumed
    pub fn has_frame(&self) -> bool {
        self.state == ParseState::CommandReceived
    }

    /// Drop any partial or pending frame and return to [`ParseState::Idle`].
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The completed frame, if the port holds one
    pub fn frame(&self) -> Option<Frame<'_>> {
        if !self.has_frame() {
            return None;
        }
        Some(Frame {
            command: self.command,
            target_id: self.target_id,
            direction: self.direction,
            payload: self.payload(),
        })
    }

    /// Payload bytes written so far
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.offset as usize]
    }

    /// Command code of the frame being assembled
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Declared payload length of the frame being assembled
    pub fn declared_len(&self) -> u8 {
        self.data_size
    }

    /// Payload bytes not yet consumed through the [`ByteSource`] impl
    pub fn remaining(&self) -> usize {
        self.offset.saturating_sub(self.read_index) as usize
    }

    /// Rewind the payload read cursor to the first byte
    pub fn rewind(&mut self) {
        self.read_index = 0;
    }
}

/// Sequential reads over the completed payload, used by action handlers.
impl ByteSource for Port {
    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if self.read_index >= self.offset {
            return Err(DecodeError::Truncated);
        }
        let byte = self.buffer[self.read_index as usize];
        self.read_index += 1;
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_port_is_idle() {
        let port = Port::new();
        assert_eq!(port.state(), ParseState::Idle);
        assert!(port.frame().is_none());
        assert!(port.payload().is_empty());
    }

    #[test]
    fn test_direction_markers() {
        assert_eq!(Direction::from_marker(b'<'), Some(Direction::Request));
        assert_eq!(Direction::from_marker(b'>'), Some(Direction::Response));
        assert_eq!(Direction::from_marker(b'!'), None);
        assert_eq!(Direction::Error.marker(), b'!');
    }

    #[test]
    fn test_read_cursor_stops_at_payload_end() {
        let mut port = Port::new();
        port.buffer[..3].copy_from_slice(&[0x34, 0x12, 0x07]);
        port.offset = 3;

        assert_eq!(port.read_u16(), Ok(0x1234));
        assert_eq!(port.remaining(), 1);
        assert_eq!(port.read_u8(), Ok(0x07));
        assert_eq!(port.read_u8(), Err(DecodeError::Truncated));

        port.rewind();
        assert_eq!(port.read_u8(), Ok(0x34));
    }
}
