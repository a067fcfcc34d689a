//! RSSI sampling task
//!
//! Samples the receiver's RSSI output at a fixed rate, feeds the device and
//! records gate crossings. A retune pauses sampling until the receiver has
//! settled.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker, Timer};

use racelap_core::config::defaults::{MIN_TUNE_TIME_MS, RSSI_READS};
use racelap_core::state::Crossing;
use racelap_hal_rp2040::rssi::RssiAdc;

use crate::channels::RETUNE;
use crate::device::with_engine;

/// Sample period
const SAMPLE_PERIOD_MS: u64 = 10;

#[embassy_executor::task]
pub async fn rssi_task(mut adc: RssiAdc<'static>) {
    info!("RSSI task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_PERIOD_MS));

    loop {
        if let Either::First(frequency) = select(RETUNE.wait(), ticker.next()).await {
            // Retuning only pauses sampling until the receiver settles.
            info!("Tuning receiver to {} MHz", frequency);
            Timer::after_millis(MIN_TUNE_TIME_MS).await;
            continue;
        }

        let raw = match adc.read_average(RSSI_READS).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("ADC read error: {:?}", e);
                continue;
            }
        };

        let now_ms = Instant::now().as_millis() as u32;
        let crossing = with_engine(|engine| {
            let device = engine.subsystem_mut();
            let sample = device.sample_rssi(raw);
            sample.entered_gate.then(|| device.crossing(now_ms))
        })
        .flatten();

        match crossing {
            Some(Crossing::Started) => info!("Timer started"),
            Some(Crossing::Lap(n)) => info!("Lap {} recorded", n),
            Some(Crossing::Finished(n)) => info!("Race finished after {} laps", n),
            Some(Crossing::Ignored) | None => {}
        }
    }
}
