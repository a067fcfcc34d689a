//! Configuration
//!
//! Compile-time defaults and the persisted settings record.

pub mod defaults;
pub mod settings;

pub use settings::{Settings, SettingsError, SETTINGS_LEN, SETTINGS_VERSION};
