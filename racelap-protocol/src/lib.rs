//! Lap timer serial protocol
//!
//! This crate defines the MSP-style (MultiWii Serial Protocol v1) framing
//! spoken between a race lap timer and its ground station, and between
//! lap timers sharing one serial line in a daisy chain.
//!
//! # Protocol Overview
//!
//! Every message uses the same binary frame:
//! ```text
//! ┌─────┬─────┬─────┬───────────┬────────┬─────────┬─────────────┬──────────┐
//! │ '$' │ 'M' │ DIR │ DEVICE ID │ LENGTH │ COMMAND │ PAYLOAD     │ CHECKSUM │
//! │ 1B  │ 1B  │ 1B  │ 1B        │ 1B     │ 1B      │ 0–64B       │ 1B       │
//! └─────┴─────┴─────┴───────────┴────────┴─────────┴─────────────┴──────────┘
//! ```
//!
//! - `DIR` is `<` for requests, `>` for responses and `!` for error replies.
//! - `DEVICE ID` addresses one timer on the line; `0` is the wildcard.
//! - `CHECKSUM` is the XOR of LENGTH, COMMAND and every PAYLOAD byte.
//!
//! Parsing is byte-at-a-time against a [`Port`], so the caller never blocks
//! and corrupted input resynchronizes on the next `$`.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod codec;
pub mod commands;
pub mod encoder;
pub mod parser;
pub mod port;

pub use codec::{ByteSink, ByteSource, DecodeError, EncodeError, SliceReader, SliceWriter};
pub use commands::{Capability, Command, CommandDescriptor};
pub use encoder::{encode_frame, frame_checksum, ResponseEncoder, MAX_FRAME_SIZE};
pub use parser::{FrameError, Progress};
pub use port::{Direction, Frame, ParseState, Port, MAX_PAYLOAD_SIZE, WILDCARD_DEVICE_ID};
