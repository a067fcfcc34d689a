//! Command dispatch
//!
//! Resolves a completed frame as a query or an action against the
//! [`LapTimerSubsystem`] and encodes the reply. Queries answer with a
//! fixed-size payload and ignore the request payload. Actions mutate the
//! subsystem and answer with an empty acknowledgement. Anything else gets an
//! empty error reply.

use racelap_protocol::commands::{API_VERSION_MAJOR, API_VERSION_MINOR, MSP_PROTOCOL_VERSION};
use racelap_protocol::{
    ByteSink, ByteSource, Capability, Command, CommandDescriptor, DecodeError, EncodeError, Port,
    ResponseEncoder, WILDCARD_DEVICE_ID,
};

use crate::state::{LapRecord, LAP_TIMER_MAXIMUM_LAPS};
use crate::traits::{FilterParams, LapTimerSubsystem};

/// How a frame was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// Query answered with its reply payload
    Query(Command),
    /// Action applied and acknowledged
    Action(Command),
    /// Unknown command code, error reply sent
    Unknown(u8),
    /// Action payload too short, error reply sent and nothing changed
    Rejected(Command),
}

/// Dispatcher state shared across frames
#[derive(Debug, Clone, Default)]
pub struct CommandDispatcher {
    selected_lap: u8,
}

impl CommandDispatcher {
    pub const fn new() -> Self {
        Self { selected_lap: 0 }
    }

    /// Lap chosen by the last select-lap action
    pub fn selected_lap(&self) -> u8 {
        self.selected_lap
    }

    /// Answer the frame held by `port`, writing the reply into `sink`.
    ///
    /// The payload read cursor of `port` is rewound first, so a frame can be
    /// dispatched after it was inspected.
    pub fn dispatch<L, S>(
        &mut self,
        subsystem: &mut L,
        port: &mut Port,
        sink: &mut S,
    ) -> Result<Disposition, EncodeError>
    where
        L: LapTimerSubsystem,
        S: ByteSink,
    {
        let code = port.command();
        let Some(descriptor) = CommandDescriptor::lookup(code) else {
            ResponseEncoder::error(sink, subsystem.device_id(), code)?.finish()?;
            return Ok(Disposition::Unknown(code));
        };

        match descriptor.capability {
            Capability::Query => {
                self.answer_query(subsystem, descriptor, sink)?;
                Ok(Disposition::Query(descriptor.command))
            }
            Capability::Action => {
                port.rewind();
                let applied = port.remaining() >= descriptor.payload_len as usize
                    && self.apply_action(subsystem, descriptor.command, port).is_ok();

                // The header is written after the action so a new device id
                // is already reflected in the acknowledgement.
                let id = subsystem.device_id();
                if applied {
                    ResponseEncoder::reply(sink, id, 0, code)?.finish()?;
                    Ok(Disposition::Action(descriptor.command))
                } else {
                    ResponseEncoder::error(sink, id, code)?.finish()?;
                    Ok(Disposition::Rejected(descriptor.command))
                }
            }
        }
    }

    fn answer_query<L, S>(
        &self,
        subsystem: &L,
        descriptor: &CommandDescriptor,
        sink: &mut S,
    ) -> Result<(), EncodeError>
    where
        L: LapTimerSubsystem,
        S: ByteSink,
    {
        let mut out = ResponseEncoder::reply(
            sink,
            subsystem.device_id(),
            descriptor.payload_len,
            descriptor.code,
        )?;
        let timer = subsystem.lap_timer();

        match descriptor.command {
            Command::ApiVersion => {
                out.write_u8(MSP_PROTOCOL_VERSION)?;
                out.write_u8(API_VERSION_MAJOR)?;
                out.write_u8(API_VERSION_MINOR)?;
            }
            Command::Status => {
                out.write_u8(subsystem.device_state().as_u8())?;
                out.write_u8(timer.state().as_u8())?;
            }
            Command::DeviceId => out.write_u8(subsystem.device_id())?,
            Command::Channel => out.write_u16(subsystem.channel())?,
            Command::CurrentLap => {
                let number = timer.count();
                write_lap(&mut out, number, timer.lap(number))?;
            }
            Command::Lap => {
                let number = self.selected_lap;
                write_lap(&mut out, number, timer.lap(number))?;
            }
            Command::LapMinTime => {
                let seconds = subsystem.min_lap_time_ms() / 1000;
                out.write_u16(seconds.min(u16::MAX as u32) as u16)?;
            }
            Command::LapMax => out.write_u8(subsystem.max_laps())?,
            Command::Rssi => {
                let rssi = subsystem.rssi();
                out.write_u16(rssi.raw)?;
                out.write_u16(rssi.min)?;
                out.write_u16(rssi.max)?;
                out.write_u16(rssi.filtered)?;
            }
            Command::RssiThreshold => out.write_u16(subsystem.rssi_threshold())?,
            Command::RssiFilter => {
                let params = subsystem.rssi_filter();
                out.write_u16(params.q)?;
                out.write_u16(params.r)?;
            }
            Command::Debug => {
                let rssi = subsystem.rssi();
                out.write_u8(subsystem.device_state().as_u8())?;
                out.write_u8(timer.state().as_u8())?;
                out.write_u8(timer.count())?;
                out.write_u16(rssi.raw)?;
                out.write_u16(rssi.filtered)?;
            }
            // Actions never reach here; the underrun check in finish catches a
            // table entry that disagrees.
            _ => {}
        }

        out.finish()
    }

    fn apply_action<L, P>(
        &mut self,
        subsystem: &mut L,
        command: Command,
        payload: &mut P,
    ) -> Result<(), DecodeError>
    where
        L: LapTimerSubsystem,
        P: ByteSource,
    {
        match command {
            Command::Reset => subsystem.reset(),
            Command::RssiCalibrate => subsystem.calibrate_rssi(),
            Command::Start => subsystem.start(),
            Command::Activate => subsystem.activate(),
            Command::Deactivate => subsystem.deactivate(),
            Command::SetDeviceId => {
                // The wildcard is never adopted, so wildcard frames keep
                // travelling down the chain.
                let id = payload.read_u8()?;
                if id != WILDCARD_DEVICE_ID {
                    subsystem.set_device_id(id);
                }
            }
            Command::SetChannel => subsystem.set_channel(payload.read_u16()?),
            Command::SetLap => {
                let requested = payload.read_u8()?;
                self.selected_lap = requested.min(subsystem.lap_timer().count());
            }
            Command::SetLapMinTime => {
                let seconds = payload.read_u16()?;
                subsystem.set_min_lap_time_ms(seconds as u32 * 1000);
            }
            Command::SetLapMax => {
                let laps = payload.read_u8()?;
                subsystem.set_max_laps(laps.min(LAP_TIMER_MAXIMUM_LAPS as u8));
            }
            Command::SetRssiThreshold => subsystem.set_rssi_threshold(payload.read_u16()?),
            Command::SetRssiFilter => {
                let q = payload.read_u16()?;
                let r = payload.read_u16()?;
                subsystem.set_rssi_filter(FilterParams { q, r });
            }
            Command::SetDebug => subsystem.set_debug(payload.read_u8()?),
            Command::EepromWrite => subsystem.persist(),
            _ => {}
        }
        Ok(())
    }
}

/// Lap number followed by the record, or zeros when there is no such lap
fn write_lap<S: ByteSink>(
    out: &mut S,
    number: u8,
    lap: Option<&LapRecord>,
) -> Result<(), EncodeError> {
    let record = lap.copied().unwrap_or_default();
    out.write_u8(number)?;
    out.write_u32(record.time_ms)?;
    out.write_u16(record.rssi)?;
    out.write_u16(record.rssi_filtered)
}
