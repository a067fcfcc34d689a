//! Racelap Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the lap timer
//! firmware is written against, so chip-specific HALs can provide them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (racelap-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  racelap-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ racelap-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key-value storage
//! - [`uart::UartConfig`] - Serial line settings for the MSP ports

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod uart;

pub use flash::{FlashError, FlashStorage, StorageKey};
pub use uart::{Parity, StopBits, UartConfig, MSP_BAUDRATE};
