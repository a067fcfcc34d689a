//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

use racelap_core::config::Settings;
use racelap_protocol::MAX_FRAME_SIZE;

/// One encoded outgoing frame
pub type OutFrame = Vec<u8, MAX_FRAME_SIZE>;

/// Channel capacity for outgoing frames per port
const FRAME_CHANNEL_SIZE: usize = 4;

/// Frame queue drained by one transmit task
pub type FrameChannel = Channel<CriticalSectionRawMutex, OutFrame, FRAME_CHANNEL_SIZE>;

/// Frames towards the host (local replies and relayed responses)
pub static UPSTREAM_TX: FrameChannel = Channel::new();

/// Frames towards the next device in the chain
pub static DOWNSTREAM_TX: FrameChannel = Channel::new();

/// Channel frequency to tune the receiver to (MHz)
pub static RETUNE: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Settings snapshot to write to flash
pub static SAVE_SETTINGS: Signal<CriticalSectionRawMutex, Settings> = Signal::new();
