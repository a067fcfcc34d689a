//! RSSI sampling on the RP2040 ADC
//!
//! The video receiver's RSSI pin is read several times per sample and
//! averaged to smooth ADC noise before filtering.

use embassy_rp::adc::{Adc, Async, Channel, Error as AdcError};

/// Averaged reader for one RSSI channel
pub struct RssiAdc<'d> {
    adc: Adc<'d, Async>,
    channel: Channel<'d>,
}

impl<'d> RssiAdc<'d> {
    pub fn new(adc: Adc<'d, Async>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }

    /// Average of `reads` conversions; `reads` of 0 is treated as 1
    pub async fn read_average(&mut self, reads: usize) -> Result<u16, AdcError> {
        let reads = reads.max(1);
        let mut sum: u32 = 0;
        for _ in 0..reads {
            sum += self.adc.read(&mut self.channel).await? as u32;
        }
        Ok((sum / reads as u32) as u16)
    }
}
