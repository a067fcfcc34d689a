//! MSP transmit tasks
//!
//! Drain the frame channels filled by the receive tasks.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::{FrameChannel, DOWNSTREAM_TX, UPSTREAM_TX};

/// Frames towards the host
#[embassy_executor::task]
pub async fn upstream_tx_task(tx: BufferedUartTx) {
    info!("Upstream TX task started");
    run_tx(tx, &UPSTREAM_TX).await
}

/// Frames towards the next device
#[embassy_executor::task]
pub async fn downstream_tx_task(tx: BufferedUartTx) {
    info!("Downstream TX task started");
    run_tx(tx, &DOWNSTREAM_TX).await
}

async fn run_tx(mut tx: BufferedUartTx, frames: &'static FrameChannel) -> ! {
    loop {
        let frame = frames.receive().await;
        if let Err(e) = tx.write_all(&frame).await {
            warn!("UART write error: {:?}", e);
            continue;
        }
        trace!("TX: {} bytes", frame.len());
    }
}
