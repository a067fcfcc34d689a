//! Byte-at-a-time frame parser.
//!
//! [`feed`] advances a [`Port`] by one input byte. Each [`ParseState`] has
//! its own transition function. Any violation resets the port to
//! [`ParseState::Idle`] before the error is returned, so a malformed frame
//! never leaves residual state behind and the stream resynchronizes on the
//! next `$`.

use crate::port::{Direction, ParseState, Port, MAX_PAYLOAD_SIZE, SYNC_DOLLAR, SYNC_M};

/// Reasons a frame was dropped
///
/// These are never answered on the wire; they exist for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// `$` was not followed by `M`
    BadPreamble,
    /// The direction marker was neither `<` nor `>`
    BadDirection,
    /// Declared LENGTH exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Trailer did not match the accumulated checksum
    InvalidChecksum,
    /// A completed frame has not been consumed yet; the byte was dropped
    FramePending,
}

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// The byte is not part of any frame (the port was idle)
    NotFrame,
    /// The byte was accepted; the frame is not complete yet
    Partial,
    /// The byte completed a checksum-valid frame; see [`Port::frame`]
    Complete,
}

/// Feed one byte to `port`.
pub fn feed(port: &mut Port, byte: u8) -> Result<Progress, FrameError> {
    match port.state {
        ParseState::Idle => Ok(on_idle(port, byte)),
        ParseState::FrameStart => on_frame_start(port, byte),
        ParseState::HeaderM => on_header_m(port, byte),
        ParseState::HeaderArrow => Ok(on_header_arrow(port, byte)),
        ParseState::HeaderDeviceId => on_header_device_id(port, byte),
        ParseState::HeaderSize => Ok(on_header_size(port, byte)),
        ParseState::HeaderCmd => on_header_cmd(port, byte),
        ParseState::CommandReceived => Err(FrameError::FramePending),
    }
}

fn on_idle(port: &mut Port, byte: u8) -> Progress {
    if byte == SYNC_DOLLAR {
        port.state = ParseState::FrameStart;
        Progress::Partial
    } else {
        Progress::NotFrame
    }
}

fn on_frame_start(port: &mut Port, byte: u8) -> Result<Progress, FrameError> {
    if byte != SYNC_M {
        port.reset();
        return Err(FrameError::BadPreamble);
    }
    port.state = ParseState::HeaderM;
    Ok(Progress::Partial)
}

fn on_header_m(port: &mut Port, byte: u8) -> Result<Progress, FrameError> {
    let Some(direction) = Direction::from_marker(byte) else {
        port.reset();
        return Err(FrameError::BadDirection);
    };
    port.direction = direction;
    port.state = ParseState::HeaderArrow;
    Ok(Progress::Partial)
}

fn on_header_arrow(port: &mut Port, byte: u8) -> Progress {
    port.target_id = byte;
    port.state = ParseState::HeaderDeviceId;
    Progress::Partial
}

fn on_header_device_id(port: &mut Port, byte: u8) -> Result<Progress, FrameError> {
    // Sole overflow guard: nothing has been written to the buffer yet.
    if byte as usize > MAX_PAYLOAD_SIZE {
        port.reset();
        return Err(FrameError::PayloadTooLarge);
    }
    port.data_size = byte;
    port.offset = 0;
    port.read_index = 0;
    port.checksum = byte;
    port.state = ParseState::HeaderSize;
    Ok(Progress::Partial)
}

fn on_header_size(port: &mut Port, byte: u8) -> Progress {
    port.command = byte;
    port.checksum ^= byte;
    port.state = ParseState::HeaderCmd;
    Progress::Partial
}

fn on_header_cmd(port: &mut Port, byte: u8) -> Result<Progress, FrameError> {
    if port.offset < port.data_size {
        port.buffer[port.offset as usize] = byte;
        port.offset += 1;
        port.checksum ^= byte;
        return Ok(Progress::Partial);
    }

    if byte != port.checksum {
        port.reset();
        return Err(FrameError::InvalidChecksum);
    }
    port.state = ParseState::CommandReceived;
    Ok(Progress::Complete)
}

impl Port {
    /// Feed one byte; see [`feed`].
    pub fn feed(&mut self, byte: u8) -> Result<Progress, FrameError> {
        feed(self, byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed bytes until a frame completes, returning how many were used
    fn feed_bytes(port: &mut Port, bytes: &[u8]) -> (usize, bool) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Ok(Progress::Complete) = port.feed(byte) {
                return (i + 1, true);
            }
        }
        (bytes.len(), false)
    }

    fn frame_bytes(dir: u8, id: u8, cmd: u8, payload: &[u8]) -> heapless::Vec<u8, 80> {
        let mut out = heapless::Vec::new();
        out.extend_from_slice(&[b'$', b'M', dir, id, payload.len() as u8, cmd])
            .unwrap();
        out.extend_from_slice(payload).unwrap();
        let checksum = payload
            .iter()
            .fold(payload.len() as u8 ^ cmd, |acc, &b| acc ^ b);
        out.push(checksum).unwrap();
        out
    }

    #[test]
    fn test_state_walk() {
        let mut port = Port::new();
        let bytes = frame_bytes(b'<', 3, 21, &[0x1A, 0x17]);
        let expected = [
            ParseState::FrameStart,
            ParseState::HeaderM,
            ParseState::HeaderArrow,
            ParseState::HeaderDeviceId,
            ParseState::HeaderSize,
            ParseState::HeaderCmd,
            ParseState::HeaderCmd,
            ParseState::HeaderCmd,
            ParseState::CommandReceived,
        ];
        for (&byte, &state) in bytes.iter().zip(expected.iter()) {
            port.feed(byte).unwrap();
            assert_eq!(port.state(), state);
        }

        let frame = port.frame().unwrap();
        assert_eq!(frame.command, 21);
        assert_eq!(frame.target_id, 3);
        assert_eq!(frame.direction, Direction::Request);
        assert_eq!(frame.payload, &[0x1A, 0x17]);
    }

    #[test]
    fn test_idle_rejects_noise() {
        let mut port = Port::new();
        assert_eq!(port.feed(b'x'), Ok(Progress::NotFrame));
        assert_eq!(port.feed(b'M'), Ok(Progress::NotFrame));
        assert_eq!(port.state(), ParseState::Idle);
    }

    #[test]
    fn test_bad_preamble_resets() {
        let mut port = Port::new();
        port.feed(b'$').unwrap();
        assert_eq!(port.feed(b'X'), Err(FrameError::BadPreamble));
        assert_eq!(port.state(), ParseState::Idle);
    }

    #[test]
    fn test_bad_direction_resets() {
        let mut port = Port::new();
        port.feed(b'$').unwrap();
        port.feed(b'M').unwrap();
        assert_eq!(port.feed(b'!'), Err(FrameError::BadDirection));
        assert_eq!(port.state(), ParseState::Idle);
    }

    #[test]
    fn test_oversize_length_rejected_before_write() {
        let mut port = Port::new();
        for &byte in b"$M<\x01" {
            port.feed(byte).unwrap();
        }
        assert_eq!(port.feed(65), Err(FrameError::PayloadTooLarge));
        assert_eq!(port.state(), ParseState::Idle);
        assert!(port.payload().is_empty());
    }

    #[test]
    fn test_max_length_accepted() {
        let payload = [0xA5u8; MAX_PAYLOAD_SIZE];
        let mut port = Port::new();
        let bytes = frame_bytes(b'>', 0, 40, &payload);
        let (used, done) = feed_bytes(&mut port, &bytes);
        assert!(done);
        assert_eq!(used, bytes.len());
        assert_eq!(port.payload(), &payload[..]);
    }

    #[test]
    fn test_checksum_mismatch_resets() {
        let mut port = Port::new();
        let mut bytes = frame_bytes(b'<', 1, 10, &[]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        for &byte in &bytes[..last] {
            port.feed(byte).unwrap();
        }
        assert_eq!(port.feed(bytes[last]), Err(FrameError::InvalidChecksum));
        assert_eq!(port.state(), ParseState::Idle);
        assert!(port.frame().is_none());
    }

    #[test]
    fn test_pending_frame_blocks_input() {
        let mut port = Port::new();
        let bytes = frame_bytes(b'<', 1, 1, &[]);
        feed_bytes(&mut port, &bytes);
        assert_eq!(port.feed(b'$'), Err(FrameError::FramePending));
        assert!(port.has_frame());

        port.reset();
        assert_eq!(port.feed(b'$'), Ok(Progress::Partial));
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut data = heapless::Vec::<u8, 32>::new();
        data.extend_from_slice(&[0x00, b'$', b'$', b'M', b'?', 0xFF]).unwrap();
        data.extend_from_slice(&frame_bytes(b'<', 2, 4, &[])).unwrap();

        let mut port = Port::new();
        let (_, done) = feed_bytes(&mut port, &data);
        assert!(done);
        assert_eq!(port.frame().unwrap().command, 4);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut data = heapless::Vec::<u8, 32>::new();
        data.extend_from_slice(&frame_bytes(b'<', 1, 10, &[])).unwrap();
        data.extend_from_slice(&frame_bytes(b'<', 1, 11, &[7])).unwrap();

        let mut port = Port::new();
        let (used, done) = feed_bytes(&mut port, &data);
        assert!(done);
        assert_eq!(port.frame().unwrap().command, 10);

        port.reset();
        let (_, done) = feed_bytes(&mut port, &data[used..]);
        assert!(done);
        assert_eq!(port.frame().unwrap().payload, &[7]);
    }
}
