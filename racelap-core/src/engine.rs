//! Protocol engine
//!
//! Ties a [`Port`] to the dispatcher and relay. Bytes are fed one at a time;
//! when a frame completes it is routed, answered and/or forwarded, and the
//! port is reset for the next frame.

use racelap_protocol::{ByteSink, EncodeError, FrameError, Port, Progress};

use crate::dispatch::{CommandDispatcher, Disposition};
use crate::relay::{Forwarded, RelayEngine, Route, RoutingPolicy};
use crate::traits::LapTimerSubsystem;

/// What a completed frame caused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handled {
    /// Command code of the frame
    pub command: u8,
    /// Routing decision
    pub route: Route,
    /// Local reply, if the frame was answered
    pub disposition: Option<Disposition>,
    /// Relayed frame, if it was forwarded
    pub forwarded: Option<Forwarded>,
}

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// The byte is not part of any frame
    NotFrame,
    /// Frame in progress
    Partial,
    /// The frame was dropped and the port reset
    Dropped(FrameError),
    /// A frame completed and was processed
    Handled(Handled),
}

/// One device's protocol engine
///
/// A device with several ports shares one engine and keeps one [`Port`] per
/// transport.
#[derive(Debug)]
pub struct Engine<L> {
    subsystem: L,
    dispatcher: CommandDispatcher,
    relay: RelayEngine,
}

impl<L: LapTimerSubsystem> Engine<L> {
    pub fn new(subsystem: L) -> Self {
        Self {
            subsystem,
            dispatcher: CommandDispatcher::new(),
            relay: RelayEngine::new(),
        }
    }

    pub fn subsystem(&self) -> &L {
        &self.subsystem
    }

    pub fn subsystem_mut(&mut self) -> &mut L {
        &mut self.subsystem
    }

    pub fn relay(&self) -> &RelayEngine {
        &self.relay
    }

    /// Feed one byte received on `port`.
    ///
    /// Local replies go to `reply`, relayed frames to `forward`. Framing
    /// errors are reported as [`Outcome::Dropped`]; only a sink that runs out
    /// of room is an error.
    pub fn feed<P, R, F>(
        &mut self,
        port: &mut Port,
        policy: &P,
        byte: u8,
        reply: &mut R,
        forward: &mut F,
    ) -> Result<Outcome, EncodeError>
    where
        P: RoutingPolicy + ?Sized,
        R: ByteSink,
        F: ByteSink,
    {
        match port.feed(byte) {
            Ok(Progress::NotFrame) => Ok(Outcome::NotFrame),
            Ok(Progress::Partial) => Ok(Outcome::Partial),
            Ok(Progress::Complete) => self
                .process(port, policy, reply, forward)
                .map(Outcome::Handled),
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("frame dropped: {}", error);
                Ok(Outcome::Dropped(error))
            }
        }
    }

    /// Route and handle the completed frame held by `port`.
    ///
    /// The port is reset afterwards, also when encoding fails.
    pub fn process<P, R, F>(
        &mut self,
        port: &mut Port,
        policy: &P,
        reply: &mut R,
        forward: &mut F,
    ) -> Result<Handled, EncodeError>
    where
        P: RoutingPolicy + ?Sized,
        R: ByteSink,
        F: ByteSink,
    {
        let result = self.handle(port, policy, reply, forward);
        port.reset();
        result
    }

    fn handle<P, R, F>(
        &mut self,
        port: &mut Port,
        policy: &P,
        reply: &mut R,
        forward: &mut F,
    ) -> Result<Handled, EncodeError>
    where
        P: RoutingPolicy + ?Sized,
        R: ByteSink,
        F: ByteSink,
    {
        let route = match port.frame() {
            Some(frame) => policy.route(&frame, self.subsystem.device_id()),
            None => Route::Drop,
        };
        let mut handled = Handled {
            command: port.command(),
            route,
            disposition: None,
            forwarded: None,
        };

        // Local first, so an enumeration relay carries the id just assigned.
        if route.is_local() {
            let disposition = self.dispatcher.dispatch(&mut self.subsystem, port, reply)?;
            #[cfg(feature = "defmt")]
            defmt::debug!("cmd {} answered: {}", handled.command, disposition);
            handled.disposition = Some(disposition);
        }

        if route.is_relay() {
            if let Some(frame) = port.frame() {
                let local_id = self.subsystem.device_id();
                let forwarded = self.relay.forward(&frame, local_id, forward)?;
                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "cmd {} for {} relayed: {}",
                    frame.command,
                    frame.target_id,
                    forwarded
                );
                handled.forwarded = Some(forwarded);
            }
        }

        Ok(handled)
    }
}
