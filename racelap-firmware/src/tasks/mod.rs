//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod rssi;
pub mod serial_rx;
pub mod serial_tx;
pub mod storage;

pub use rssi::rssi_task;
pub use serial_rx::{downstream_rx_task, upstream_rx_task};
pub use serial_tx::{downstream_tx_task, upstream_tx_task};
pub use storage::storage_task;
