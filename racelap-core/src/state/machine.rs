//! Device state machine definition

use super::events::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Device states
///
/// The discriminants are the values sent in status replies and stored in
/// settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum DeviceState {
    /// Powered and listening, not timing
    #[default]
    Idle = 0,
    /// Recording laps
    Timing = 1,
    /// Sampling RSSI to pick a threshold
    CalibrateRssi = 2,
    /// Switched off by the ground station
    Inactive = 3,
}

impl DeviceState {
    /// Wire value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DeviceState::Idle),
            1 => Some(DeviceState::Timing),
            2 => Some(DeviceState::CalibrateRssi),
            3 => Some(DeviceState::Inactive),
            _ => None,
        }
    }

    /// Whether lap crossings should be recorded
    pub fn is_timing(&self) -> bool {
        matches!(self, DeviceState::Timing)
    }

    /// Whether this state only exists while the device is running
    ///
    /// Transient states are not restored from settings after a reboot.
    pub fn is_transient(&self) -> bool {
        matches!(self, DeviceState::Timing | DeviceState::CalibrateRssi)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use DeviceState::*;
        use Event::*;

        match (self, event) {
            // Inactive ignores everything but Activate
            (Inactive, Activate) => Idle,
            (Inactive, _) => Inactive,

            (_, Deactivate) => Inactive,

            (Idle, Start) => Timing,
            (Idle, Calibrate) => CalibrateRssi,

            // Start while timing re-arms the lap timer
            (Timing, Start) => Timing,
            (Timing, Reset) => Idle,

            (CalibrateRssi, CalibrationComplete) => Idle,
            (CalibrateRssi, Reset) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_reset() {
        let timing = DeviceState::Idle.transition(Event::Start);
        assert_eq!(timing, DeviceState::Timing);
        assert_eq!(timing.transition(Event::Start), DeviceState::Timing);
        assert_eq!(timing.transition(Event::Reset), DeviceState::Idle);
    }

    #[test]
    fn test_calibration_flow() {
        let calibrating = DeviceState::Idle.transition(Event::Calibrate);
        assert_eq!(calibrating, DeviceState::CalibrateRssi);
        assert_eq!(calibrating.transition(Event::Start), DeviceState::CalibrateRssi);
        assert_eq!(
            calibrating.transition(Event::CalibrationComplete),
            DeviceState::Idle
        );
    }

    #[test]
    fn test_deactivate_from_any_active_state() {
        for state in [
            DeviceState::Idle,
            DeviceState::Timing,
            DeviceState::CalibrateRssi,
        ] {
            assert_eq!(state.transition(Event::Deactivate), DeviceState::Inactive);
        }
    }

    #[test]
    fn test_inactive_only_wakes_on_activate() {
        let events = [
            Event::Start,
            Event::Reset,
            Event::Calibrate,
            Event::CalibrationComplete,
            Event::Deactivate,
        ];
        for event in events {
            assert_eq!(DeviceState::Inactive.transition(event), DeviceState::Inactive);
        }
        assert_eq!(
            DeviceState::Inactive.transition(Event::Activate),
            DeviceState::Idle
        );
    }

    #[test]
    fn test_calibrate_ignored_while_timing() {
        assert_eq!(
            DeviceState::Timing.transition(Event::Calibrate),
            DeviceState::Timing
        );
    }

    #[test]
    fn test_wire_values() {
        for value in 0..4 {
            assert_eq!(DeviceState::from_u8(value).unwrap().as_u8(), value);
        }
        assert_eq!(DeviceState::from_u8(4), None);
    }
}
