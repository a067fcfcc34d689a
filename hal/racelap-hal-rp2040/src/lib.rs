//! RP2040-specific HAL for the lap timer firmware
//!
//! This crate provides RP2040 implementations of the shared `racelap-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - Flash storage driver (implements `racelap_hal::FlashStorage`)
//! - Averaged RSSI sampling on an ADC channel
//! - Conversion of `racelap_hal::UartConfig` to the embassy UART config

#![no_std]

pub mod flash;
pub mod rssi;
pub mod uart;

// Re-export shared traits from racelap-hal for convenience
pub use racelap_hal::{FlashStorage as FlashStorageTrait, StorageKey};
