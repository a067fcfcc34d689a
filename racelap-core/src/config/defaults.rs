//! Factory defaults

/// Device id until the ground station assigns one
pub const DEVICE_ID: u8 = 1;

/// RSSI crossing threshold
pub const RSSI_THRESHOLD: u16 = 200;

/// Band A, channel 1
pub const CHANNEL_MHZ: u16 = 5865;

/// Shortest accepted lap
pub const MIN_LAP_TIME_S: u8 = 5;

/// Lap maximum
pub const MAX_LAPS: u8 = 50;

/// RSSI filter process noise
pub const RSSI_FILTER_Q: u16 = 2000;

/// RSSI filter measurement noise
pub const RSSI_FILTER_R: u16 = 40;

/// Filtered samples taken while calibrating the threshold
pub const RSSI_CALIBRATE_READS: u16 = 100;

/// ADC reads averaged into one RSSI sample
pub const RSSI_READS: usize = 5;

/// Settling time after a retune, in milliseconds
pub const MIN_TUNE_TIME_MS: u64 = 35;
