//! Receiver, filter and storage collaborators of [`crate::Device`]

use crate::config::Settings;

/// Video receiver tuning
pub trait Tuner {
    /// Retune to `frequency_mhz`
    ///
    /// Implementations wait for the module to settle before the next RSSI
    /// reading is trusted.
    fn tune(&mut self, frequency_mhz: u16);
}

/// RSSI smoothing
pub trait RssiFilter {
    /// Feed one raw reading, returning the filtered value
    fn filter(&mut self, raw: u16) -> u16;

    /// Apply new process (`q`) and measurement (`r`) noise parameters
    fn configure(&mut self, q: u16, r: u16);
}

/// Filter that returns readings unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl RssiFilter for Passthrough {
    fn filter(&mut self, raw: u16) -> u16 {
        raw
    }

    fn configure(&mut self, _q: u16, _r: u16) {}
}

/// Settings persistence
pub trait SettingsStore {
    /// Storage error type
    type Error;

    /// Write the settings record
    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error>;
}

/// Settings are dropped, for boards without storage
impl SettingsStore for () {
    type Error = core::convert::Infallible;

    fn save(&mut self, _settings: &Settings) -> Result<(), Self::Error> {
        Ok(())
    }
}
