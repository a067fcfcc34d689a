//! Collaborator traits
//!
//! These traits define the interface between the protocol engine and the
//! lap timer hardware and storage implementations.

pub mod subsystem;
pub mod tuner;

pub use subsystem::{FilterParams, LapTimerSubsystem, RssiReading};
pub use tuner::{Passthrough, RssiFilter, SettingsStore, Tuner};
