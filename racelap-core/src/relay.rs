//! Routing and relay for daisy-chained devices
//!
//! Devices share one serial line by passing frames down the chain. A
//! [`RoutingPolicy`] decides whether a completed frame is answered locally,
//! relayed to the next device, or both. [`RelayEngine`] re-encodes relayed
//! frames and implements the enumeration handshake: a set-device-id request
//! leaves every device carrying that device's id plus one, so ids step up by
//! one per hop without central configuration.

use racelap_protocol::commands::MSP_SET_DEVICE_ID;
use racelap_protocol::{encode_frame, ByteSink, Direction, EncodeError, Frame};

/// Where a completed frame goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// Answer locally
    Local,
    /// Pass to the next device
    Relay,
    /// Answer locally, then pass on
    LocalAndRelay,
    /// Neither
    Drop,
}

impl Route {
    /// Whether the local dispatcher sees the frame
    pub fn is_local(self) -> bool {
        matches!(self, Route::Local | Route::LocalAndRelay)
    }

    /// Whether the frame is forwarded
    pub fn is_relay(self) -> bool {
        matches!(self, Route::Relay | Route::LocalAndRelay)
    }
}

/// Per-frame routing decision
pub trait RoutingPolicy {
    /// Route `frame` on a device whose id is `local_id`
    fn route(&self, frame: &Frame<'_>, local_id: u8) -> Route;
}

impl<F> RoutingPolicy for F
where
    F: Fn(&Frame<'_>, u8) -> Route,
{
    fn route(&self, frame: &Frame<'_>, local_id: u8) -> Route {
        self(frame, local_id)
    }
}

/// Host-facing port of a chained device
///
/// Frames for this device stay here, wildcard frames are answered and passed
/// on, everything else is passed on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainPolicy;

impl RoutingPolicy for ChainPolicy {
    fn route(&self, frame: &Frame<'_>, local_id: u8) -> Route {
        if frame.target_id == local_id {
            Route::Local
        } else if frame.is_wildcard() {
            Route::LocalAndRelay
        } else {
            Route::Relay
        }
    }
}

/// Downstream-facing port: every frame goes back towards the host
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayAll;

impl RoutingPolicy for RelayAll {
    fn route(&self, _frame: &Frame<'_>, _local_id: u8) -> Route {
        Route::Relay
    }
}

/// What was written for a relayed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Forwarded {
    /// Header and payload re-encoded unchanged
    Verbatim,
    /// Set-device-id request rewritten for the next device
    Enumerated { next_id: u8 },
}

/// Re-encodes frames for the next hop
#[derive(Debug, Clone, Default)]
pub struct RelayEngine {
    relayed: u32,
    enumerated: u32,
}

impl RelayEngine {
    pub const fn new() -> Self {
        Self {
            relayed: 0,
            enumerated: 0,
        }
    }

    /// Frames forwarded so far
    pub fn relayed(&self) -> u32 {
        self.relayed
    }

    /// Enumeration requests rewritten so far
    pub fn enumerated(&self) -> u32 {
        self.enumerated
    }

    /// Write `frame` for the next device into `sink`.
    ///
    /// The checksum is recomputed. A set-device-id request is rewritten to a
    /// one-byte payload of `local_id + 1`, wrapping at 255.
    pub fn forward<S: ByteSink>(
        &mut self,
        frame: &Frame<'_>,
        local_id: u8,
        sink: &mut S,
    ) -> Result<Forwarded, EncodeError> {
        let enumeration =
            frame.direction == Direction::Request && frame.command == MSP_SET_DEVICE_ID;
        let forwarded = if enumeration {
            let next_id = local_id.wrapping_add(1);
            encode_frame(sink, frame.direction, frame.target_id, frame.command, &[next_id])?;
            self.enumerated = self.enumerated.wrapping_add(1);
            Forwarded::Enumerated { next_id }
        } else {
            encode_frame(sink, frame.direction, frame.target_id, frame.command, frame.payload)?;
            Forwarded::Verbatim
        };
        self.relayed = self.relayed.wrapping_add(1);
        Ok(forwarded)
    }
}
