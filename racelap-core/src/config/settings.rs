//! Persisted settings record
//!
//! Fixed 16-byte little-endian layout:
//!
//! ```text
//! 0  version        u8
//! 1  device state   u8
//! 2  channel        u16
//! 4  min lap (s)    u8
//! 5  max laps       u8
//! 6  rssi min       u16
//! 8  rssi max       u16
//! 10 threshold      u16
//! 12 filter q       u16
//! 14 filter r       u16
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use racelap_protocol::{ByteSink, ByteSource, DecodeError, EncodeError, SliceReader, SliceWriter};

use super::defaults;
use crate::state::DeviceState;

/// Record layout version; bump to force a factory reset
pub const SETTINGS_VERSION: u8 = 3;

/// Encoded record size
pub const SETTINGS_LEN: usize = 16;

/// Errors decoding a settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Record shorter than [`SETTINGS_LEN`]
    Truncated,
    /// Written by a different layout version
    VersionMismatch(u8),
    /// Device state byte out of range
    InvalidState(u8),
}

impl From<DecodeError> for SettingsError {
    fn from(_: DecodeError) -> Self {
        SettingsError::Truncated
    }
}

/// Settings that survive a power cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    pub state: DeviceState,
    /// Channel frequency in MHz
    pub channel: u16,
    /// Shortest accepted lap in whole seconds
    pub min_lap_time_s: u8,
    pub max_laps: u8,
    pub rssi_min: u16,
    pub rssi_max: u16,
    pub rssi_threshold: u16,
    pub rssi_filter_q: u16,
    pub rssi_filter_r: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state: DeviceState::Idle,
            channel: defaults::CHANNEL_MHZ,
            min_lap_time_s: defaults::MIN_LAP_TIME_S,
            max_laps: defaults::MAX_LAPS,
            rssi_min: u16::MAX,
            rssi_max: 0,
            rssi_threshold: defaults::RSSI_THRESHOLD,
            rssi_filter_q: defaults::RSSI_FILTER_Q,
            rssi_filter_r: defaults::RSSI_FILTER_R,
        }
    }
}

impl Settings {
    /// Write the record into `sink`
    pub fn encode_into<S: ByteSink>(&self, sink: &mut S) -> Result<(), EncodeError> {
        sink.write_u8(SETTINGS_VERSION)?;
        sink.write_u8(self.state.as_u8())?;
        sink.write_u16(self.channel)?;
        sink.write_u8(self.min_lap_time_s)?;
        sink.write_u8(self.max_laps)?;
        sink.write_u16(self.rssi_min)?;
        sink.write_u16(self.rssi_max)?;
        sink.write_u16(self.rssi_threshold)?;
        sink.write_u16(self.rssi_filter_q)?;
        sink.write_u16(self.rssi_filter_r)
    }

    /// Encode into a fixed array
    pub fn to_bytes(&self) -> [u8; SETTINGS_LEN] {
        let mut buf = [0u8; SETTINGS_LEN];
        let mut writer = SliceWriter::new(&mut buf);
        // The record is exactly SETTINGS_LEN bytes, so the writer never fills up.
        let _ = self.encode_into(&mut writer);
        buf
    }

    /// Decode a record
    ///
    /// Transient device states are restored as [`DeviceState::Idle`].
    pub fn decode(bytes: &[u8]) -> Result<Self, SettingsError> {
        let mut reader = SliceReader::new(bytes);

        let version = reader.read_u8()?;
        if version != SETTINGS_VERSION {
            return Err(SettingsError::VersionMismatch(version));
        }

        let state_byte = reader.read_u8()?;
        let state =
            DeviceState::from_u8(state_byte).ok_or(SettingsError::InvalidState(state_byte))?;
        let state = if state.is_transient() {
            DeviceState::Idle
        } else {
            state
        };

        Ok(Self {
            state,
            channel: reader.read_u16()?,
            min_lap_time_s: reader.read_u8()?,
            max_laps: reader.read_u8()?,
            rssi_min: reader.read_u16()?,
            rssi_max: reader.read_u16()?,
            rssi_threshold: reader.read_u16()?,
            rssi_filter_q: reader.read_u16()?,
            rssi_filter_r: reader.read_u16()?,
        })
    }

    /// Decode a stored record, falling back to defaults
    pub fn load_or_default(bytes: Option<&[u8]>) -> Self {
        bytes
            .and_then(|b| Self::decode(b).ok())
            .unwrap_or_default()
    }

    /// Shortest accepted lap in milliseconds
    pub fn min_lap_time_ms(&self) -> u32 {
        self.min_lap_time_s as u32 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let settings = Settings {
            state: DeviceState::Inactive,
            channel: 0x16E9,
            min_lap_time_s: 7,
            max_laps: 12,
            rssi_min: 0x0102,
            rssi_max: 0x0304,
            rssi_threshold: 0x0506,
            rssi_filter_q: 0x0708,
            rssi_filter_r: 0x090A,
        };
        assert_eq!(
            settings.to_bytes(),
            [3, 3, 0xE9, 0x16, 7, 12, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07, 0x0A, 0x09]
        );
    }

    #[test]
    fn test_decode_restores_fields() {
        let mut settings = Settings::default();
        settings.channel = 5740;
        settings.rssi_threshold = 321;
        assert_eq!(Settings::decode(&settings.to_bytes()), Ok(settings));
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = Settings::default().to_bytes();
        bytes[0] = 2;
        assert_eq!(Settings::decode(&bytes), Err(SettingsError::VersionMismatch(2)));
        assert_eq!(Settings::load_or_default(Some(&bytes)), Settings::default());
    }

    #[test]
    fn test_short_record() {
        let bytes = Settings::default().to_bytes();
        assert_eq!(Settings::decode(&bytes[..15]), Err(SettingsError::Truncated));
        assert_eq!(Settings::load_or_default(None), Settings::default());
    }

    #[test]
    fn test_invalid_state() {
        let mut bytes = Settings::default().to_bytes();
        bytes[1] = 9;
        assert_eq!(Settings::decode(&bytes), Err(SettingsError::InvalidState(9)));
    }

    #[test]
    fn test_transient_state_restored_as_idle() {
        let mut bytes = Settings::default().to_bytes();
        bytes[1] = DeviceState::Timing.as_u8();
        assert_eq!(Settings::decode(&bytes).unwrap().state, DeviceState::Idle);
    }
}
