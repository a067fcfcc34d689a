//! Settings storage task
//!
//! Writes settings snapshots to flash off the serial path.

use defmt::*;

use crate::channels::SAVE_SETTINGS;
use crate::config::SettingsPersistence;

#[embassy_executor::task]
pub async fn storage_task(mut persistence: SettingsPersistence<'static>) {
    info!("Storage task started");

    loop {
        let settings = SAVE_SETTINGS.wait().await;
        match persistence.save(&settings).await {
            Ok(()) => info!("Settings saved"),
            Err(e) => warn!("Failed to save settings: {:?}", e),
        }
    }
}
