//! Lap timer subsystem trait consumed by command handlers

use crate::state::{DeviceState, LapTimer};

/// RSSI bundle reported by the RSSI query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RssiReading {
    /// Last raw reading
    pub raw: u16,
    /// Lowest raw reading seen
    pub min: u16,
    /// Highest raw reading seen
    pub max: u16,
    /// Last filtered reading
    pub filtered: u16,
}

/// RSSI filter tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterParams {
    /// Process noise
    pub q: u16,
    /// Measurement noise
    pub r: u16,
}

/// Everything the command handlers read and mutate
///
/// Calls are synchronous and infallible. Setters that have side effects
/// (retuning the receiver, recomputing the filter) perform them before
/// returning.
pub trait LapTimerSubsystem {
    /// Local device id
    fn device_id(&self) -> u8;

    /// Change the local device id
    ///
    /// The wildcard id is reserved for addressing and must not be adopted.
    fn set_device_id(&mut self, id: u8);

    /// Current device state
    fn device_state(&self) -> DeviceState;

    /// Lap timer snapshot
    fn lap_timer(&self) -> &LapTimer;

    /// Current RSSI bundle
    fn rssi(&self) -> RssiReading;

    /// Receiver channel frequency in MHz
    fn channel(&self) -> u16;

    /// Set the channel and retune the receiver
    fn set_channel(&mut self, channel: u16);

    /// RSSI crossing threshold
    fn rssi_threshold(&self) -> u16;

    /// Set the RSSI crossing threshold
    fn set_rssi_threshold(&mut self, threshold: u16);

    /// RSSI filter parameters
    fn rssi_filter(&self) -> FilterParams;

    /// Set the filter parameters and recompute the filter
    fn set_rssi_filter(&mut self, params: FilterParams);

    /// Shortest accepted lap in milliseconds
    fn min_lap_time_ms(&self) -> u32;

    /// Set the shortest accepted lap in milliseconds
    fn set_min_lap_time_ms(&mut self, ms: u32);

    /// Lap maximum
    fn max_laps(&self) -> u8;

    /// Set the lap maximum; callers clamp to the hard limit
    fn set_max_laps(&mut self, laps: u8);

    /// Debug flag
    fn debug(&self) -> u8;

    /// Set the debug flag
    fn set_debug(&mut self, debug: u8);

    /// Stop timing or calibration and clear laps
    fn reset(&mut self);

    /// Arm the lap timer and start timing
    fn start(&mut self);

    /// Leave the inactive state
    fn activate(&mut self);

    /// Stop reacting to the gate
    fn deactivate(&mut self);

    /// Begin RSSI threshold calibration
    fn calibrate_rssi(&mut self);

    /// Persist the current settings
    fn persist(&mut self);
}
