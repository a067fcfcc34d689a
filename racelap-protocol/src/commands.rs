//! Command codes and their payload contracts
//!
//! Commands are divided into two capabilities:
//! - Query: read-only, answered with a fixed-size payload
//! - Action: mutates the device, answered with an empty acknowledgement

/// Protocol version reported by [`Command::ApiVersion`]
pub const MSP_PROTOCOL_VERSION: u8 = 0;
/// Incremented on breaking command changes
pub const API_VERSION_MAJOR: u8 = 2;
/// Incremented on any command change, reset on a major bump
pub const API_VERSION_MINOR: u8 = 6;

// Command codes
pub const MSP_API_VERSION: u8 = 1;
pub const MSP_STATUS: u8 = 4;
pub const MSP_RESET: u8 = 5;
pub const MSP_RSSI_CALIBRATE: u8 = 6;
pub const MSP_START: u8 = 7;
pub const MSP_ACTIVATE: u8 = 8;
pub const MSP_DEACTIVATE: u8 = 9;
pub const MSP_DEVICE_ID: u8 = 10;
pub const MSP_SET_DEVICE_ID: u8 = 11;
pub const MSP_CHANNEL: u8 = 20;
pub const MSP_SET_CHANNEL: u8 = 21;
pub const MSP_CURRENT_LAP: u8 = 30;
pub const MSP_LAP: u8 = 31;
pub const MSP_SET_LAP: u8 = 32;
pub const MSP_LAP_MIN_TIME: u8 = 34;
pub const MSP_SET_LAP_MIN_TIME: u8 = 35;
pub const MSP_LAP_MAX: u8 = 37;
pub const MSP_SET_LAP_MAX: u8 = 38;
pub const MSP_RSSI: u8 = 40;
pub const MSP_RSSI_THRESHOLD: u8 = 42;
pub const MSP_SET_RSSI_THRESHOLD: u8 = 43;
pub const MSP_RSSI_FILTER: u8 = 44;
pub const MSP_SET_RSSI_FILTER: u8 = 45;
pub const MSP_DEBUG: u8 = 90;
pub const MSP_SET_DEBUG: u8 = 91;
pub const MSP_EEPROM_WRITE: u8 = 250;

/// What a command does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability {
    /// Read-only; the request payload is ignored
    Query,
    /// Mutates device state; replies with an empty payload
    Action,
}

/// Known commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    ApiVersion,
    Status,
    Reset,
    RssiCalibrate,
    Start,
    Activate,
    Deactivate,
    DeviceId,
    SetDeviceId,
    Channel,
    SetChannel,
    CurrentLap,
    Lap,
    SetLap,
    LapMinTime,
    SetLapMinTime,
    LapMax,
    SetLapMax,
    Rssi,
    RssiThreshold,
    SetRssiThreshold,
    RssiFilter,
    SetRssiFilter,
    Debug,
    SetDebug,
    EepromWrite,
}

/// Static table entry for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandDescriptor {
    /// Which command this describes
    pub command: Command,
    /// Wire code
    pub code: u8,
    /// Query or action
    pub capability: Capability,
    /// Reply length for queries, minimum request payload for actions
    pub payload_len: u8,
}

const fn query(command: Command, code: u8, reply_len: u8) -> CommandDescriptor {
    CommandDescriptor {
        command,
        code,
        capability: Capability::Query,
        payload_len: reply_len,
    }
}

const fn action(command: Command, code: u8, payload_len: u8) -> CommandDescriptor {
    CommandDescriptor {
        command,
        code,
        capability: Capability::Action,
        payload_len,
    }
}

/// Every supported command, in code order
pub static COMMANDS: [CommandDescriptor; 26] = [
    query(Command::ApiVersion, MSP_API_VERSION, 3),
    query(Command::Status, MSP_STATUS, 2),
    action(Command::Reset, MSP_RESET, 0),
    action(Command::RssiCalibrate, MSP_RSSI_CALIBRATE, 0),
    action(Command::Start, MSP_START, 0),
    action(Command::Activate, MSP_ACTIVATE, 0),
    action(Command::Deactivate, MSP_DEACTIVATE, 0),
    query(Command::DeviceId, MSP_DEVICE_ID, 1),
    action(Command::SetDeviceId, MSP_SET_DEVICE_ID, 1),
    query(Command::Channel, MSP_CHANNEL, 2),
    action(Command::SetChannel, MSP_SET_CHANNEL, 2),
    query(Command::CurrentLap, MSP_CURRENT_LAP, 9),
    query(Command::Lap, MSP_LAP, 9),
    action(Command::SetLap, MSP_SET_LAP, 1),
    query(Command::LapMinTime, MSP_LAP_MIN_TIME, 2),
    action(Command::SetLapMinTime, MSP_SET_LAP_MIN_TIME, 2),
    query(Command::LapMax, MSP_LAP_MAX, 1),
    action(Command::SetLapMax, MSP_SET_LAP_MAX, 1),
    query(Command::Rssi, MSP_RSSI, 8),
    query(Command::RssiThreshold, MSP_RSSI_THRESHOLD, 2),
    action(Command::SetRssiThreshold, MSP_SET_RSSI_THRESHOLD, 2),
    query(Command::RssiFilter, MSP_RSSI_FILTER, 4),
    action(Command::SetRssiFilter, MSP_SET_RSSI_FILTER, 4),
    query(Command::Debug, MSP_DEBUG, 7),
    action(Command::SetDebug, MSP_SET_DEBUG, 1),
    action(Command::EepromWrite, MSP_EEPROM_WRITE, 0),
];

impl Command {
    /// Look up a wire code
    pub fn from_code(code: u8) -> Option<Self> {
        CommandDescriptor::lookup(code).map(|d| d.command)
    }

    /// Table entry for this command
    pub fn descriptor(self) -> &'static CommandDescriptor {
        // Every variant has exactly one table row, in declaration order.
        &COMMANDS[self as usize]
    }

    /// Wire code
    pub fn code(self) -> u8 {
        self.descriptor().code
    }

    /// Query or action
    pub fn capability(self) -> Capability {
        self.descriptor().capability
    }
}

impl CommandDescriptor {
    /// Find the table entry for a wire code
    pub fn lookup(code: u8) -> Option<&'static CommandDescriptor> {
        COMMANDS.iter().find(|d| d.code == code)
    }
}
