//! Lap timer device wiring
//!
//! The protocol engine and its device are shared between the serial and
//! RSSI tasks through a blocking mutex. Retuning and flash writes are handed
//! off to their own tasks through signals so the critical section never
//! waits on hardware.

use core::cell::RefCell;
use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use racelap_core::config::Settings;
use racelap_core::traits::{Passthrough, SettingsStore, Tuner};
use racelap_core::{Device, Engine};

use crate::channels::{RETUNE, SAVE_SETTINGS};

/// Tuner that forwards frequency changes to the RSSI task
pub struct SignalTuner;

impl Tuner for SignalTuner {
    fn tune(&mut self, frequency_mhz: u16) {
        RETUNE.signal(frequency_mhz);
    }
}

/// Store that forwards settings snapshots to the storage task
pub struct SignalStore;

impl SettingsStore for SignalStore {
    type Error = Infallible;

    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        SAVE_SETTINGS.signal(*settings);
        Ok(())
    }
}

pub type FirmwareDevice = Device<SignalTuner, SignalStore, Passthrough>;

/// Shared protocol engine, installed once at startup
static ENGINE: Mutex<CriticalSectionRawMutex, RefCell<Option<Engine<FirmwareDevice>>>> =
    Mutex::new(RefCell::new(None));

/// Build the device from persisted settings and install the engine
pub fn install(settings: &Settings) {
    let device = FirmwareDevice::from_settings(settings, SignalTuner, SignalStore, Passthrough);
    ENGINE.lock(|cell| cell.replace(Some(Engine::new(device))));
}

/// Run `f` against the engine; `None` before [`install`]
pub fn with_engine<R>(f: impl FnOnce(&mut Engine<FirmwareDevice>) -> R) -> Option<R> {
    ENGINE.lock(|cell| cell.borrow_mut().as_mut().map(f))
}
