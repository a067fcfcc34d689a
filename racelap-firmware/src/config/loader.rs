//! Settings persistence
//!
//! Loads the lap timer settings record from flash storage.
//! Falls back to compile-time defaults if flash is empty or the record
//! layout does not match.

use defmt::*;

use racelap_core::config::{Settings, SettingsError, SETTINGS_VERSION};
use racelap_hal_rp2040::flash::{FlashError, FlashStorage, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use racelap_hal_rp2040::FlashStorageTrait;

/// Read buffer for the stored record
///
/// Larger than the current layout so a record written by another layout
/// version still reads and is rejected by version, not by size.
const MAX_RECORD_SIZE: usize = 64;

/// Settings persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Flash operation failed
    Flash(FlashError),
    /// Stored record is not a valid settings record
    Settings(SettingsError),
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

impl From<SettingsError> for StoreError {
    fn from(e: SettingsError) -> Self {
        StoreError::Settings(e)
    }
}

/// Settings persistence manager
pub struct SettingsPersistence<'d> {
    storage: FlashStorage<'d>,
}

impl<'d> SettingsPersistence<'d> {
    pub fn new(storage: FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Load the settings record from flash
    pub async fn load(&mut self) -> Result<Settings, StoreError> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let len = self.storage.read(StorageKey::Settings, &mut buffer).await?;
        debug!("Read {} bytes of settings from flash", len);

        let record = buffer.get(..len).ok_or(FlashError::BufferTooSmall)?;
        let settings = Settings::decode(record)?;
        log_settings_summary(&settings);
        Ok(settings)
    }

    /// Load the settings record, or defaults when none is usable
    pub async fn load_or_default(&mut self) -> Settings {
        match self.load().await {
            Ok(settings) => {
                info!("Loaded settings from flash");
                settings
            }
            Err(StoreError::Flash(FlashError::NotFound)) => {
                info!("No settings in flash, using defaults");
                Settings::default()
            }
            Err(StoreError::Settings(SettingsError::VersionMismatch(found))) => {
                warn!(
                    "Settings layout {} does not match {}, using defaults",
                    found, SETTINGS_VERSION
                );
                Settings::default()
            }
            Err(e) => {
                warn!("Failed to load settings: {:?}, using defaults", e);
                Settings::default()
            }
        }
    }

    /// Write the settings record to flash
    pub async fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.storage
            .write(StorageKey::Settings, &settings.to_bytes())
            .await?;
        debug!("Saved settings to flash");
        Ok(())
    }
}

fn log_settings_summary(settings: &Settings) {
    info!(
        "Settings: state={} channel={} MHz threshold={} min lap={}s max laps={}",
        settings.state.as_u8(),
        settings.channel,
        settings.rssi_threshold,
        settings.min_lap_time_s,
        settings.max_laps
    );
}
