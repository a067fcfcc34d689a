//! Board-agnostic core logic for the lap timer firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (lap timer subsystem, tuner, RSSI filter, storage)
//! - Device and lap timer state machines
//! - Persisted settings layout and defaults
//! - Command dispatch, relay and routing for daisy-chained devices
//! - The [`Engine`] that ties a [`racelap_protocol::Port`] to all of the above

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod device;
pub mod dispatch;
pub mod engine;
pub mod relay;
pub mod state;
pub mod traits;

pub use device::{Device, Sample};
pub use dispatch::{CommandDispatcher, Disposition};
pub use engine::{Engine, Handled, Outcome};
pub use relay::{ChainPolicy, Forwarded, RelayAll, RelayEngine, Route, RoutingPolicy};
pub use traits::LapTimerSubsystem;
