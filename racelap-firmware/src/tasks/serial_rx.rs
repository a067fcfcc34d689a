//! MSP receive tasks
//!
//! Each UART owns its own [`Port`]. Bytes are fed to the shared engine one at
//! a time; replies and relayed frames are encoded inside the critical section
//! and queued for the transmit tasks afterwards.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use racelap_core::{ChainPolicy, Outcome, RelayAll, RoutingPolicy};
use racelap_protocol::Port;

use crate::channels::{FrameChannel, OutFrame, DOWNSTREAM_TX, UPSTREAM_TX};
use crate::device::with_engine;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Host-facing port: answers its own and wildcard frames, relays the rest
#[embassy_executor::task]
pub async fn upstream_rx_task(rx: BufferedUartRx) {
    info!("Upstream RX task started");
    run_rx(rx, &ChainPolicy, &UPSTREAM_TX, &DOWNSTREAM_TX).await
}

/// Port towards the next device: everything goes back to the host
#[embassy_executor::task]
pub async fn downstream_rx_task(rx: BufferedUartRx) {
    info!("Downstream RX task started");
    run_rx(rx, &RelayAll, &DOWNSTREAM_TX, &UPSTREAM_TX).await
}

async fn run_rx<P: RoutingPolicy>(
    mut rx: BufferedUartRx,
    policy: &P,
    reply_to: &'static FrameChannel,
    forward_to: &'static FrameChannel,
) -> ! {
    let mut port = Port::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            let mut reply = OutFrame::new();
            let mut forward = OutFrame::new();

            let outcome = with_engine(|engine| {
                engine.feed(&mut port, policy, byte, &mut reply, &mut forward)
            });

            match outcome {
                Some(Ok(Outcome::Handled(handled))) => {
                    debug!(
                        "cmd {} routed {}: {:?}",
                        handled.command, handled.route, handled.disposition
                    );
                }
                Some(Ok(Outcome::Dropped(e))) => {
                    trace!("Frame dropped: {:?}", e);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Failed to encode frame: {:?}", e);
                }
                None => {
                    warn!("Engine not installed, byte ignored");
                }
            }

            if !reply.is_empty() {
                reply_to.send(reply).await;
            }
            if !forward.is_empty() {
                forward_to.send(forward).await;
            }
        }
    }
}
