//! Device and lap timer state
//!
//! The device state machine is explicit, finite, and deterministic.
//! Lap bookkeeping lives in [`LapTimer`].

pub mod events;
pub mod lap_timer;
pub mod machine;

pub use events::Event;
pub use lap_timer::{Crossing, LapRecord, LapTimer, LapTimerState, LAP_TIMER_MAXIMUM_LAPS};
pub use machine::DeviceState;
