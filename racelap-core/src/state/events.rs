//! Events that trigger device state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Arm the lap timer and start timing
    Start,
    /// Stop timing or calibration and clear laps
    Reset,
    /// Begin RSSI threshold calibration
    Calibrate,
    /// Calibration collected enough samples
    CalibrationComplete,
    /// Leave the inactive state
    Activate,
    /// Ignore the gate until activated again
    Deactivate,
}
