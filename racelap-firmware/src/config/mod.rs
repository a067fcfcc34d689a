//! Settings persistence for the firmware

mod loader;

pub use loader::{SettingsPersistence, StoreError};
