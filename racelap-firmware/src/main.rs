//! Racelap - FPV Lap Timer Firmware
//!
//! Main firmware binary for RP2040-based lap timer nodes. Each node answers
//! MSP requests from the host on its upstream UART and relays traffic to and
//! from the next node on its downstream UART, so several nodes can share one
//! host connection as a daisy chain.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{DMA_CH0, FLASH, UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_rp::Peri;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use racelap_core::config::Settings;
use racelap_hal::UartConfig;
use racelap_hal_rp2040::flash::FlashStorage;
use racelap_hal_rp2040::rssi::RssiAdc;
use racelap_hal_rp2040::uart::uart_config;

use crate::config::SettingsPersistence;

mod channels;
mod config;
mod device;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// UART ring buffer size, room for a few full frames
const UART_BUF_SIZE: usize = 256;

// Static cells for UART buffers (must live forever)
static UP_TX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static UP_RX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static DOWN_TX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static DOWN_RX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Racelap firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Settings first: the device is built from them
    let (settings, persistence) = load_settings_from_flash(p.FLASH, p.DMA_CH0).await;
    device::install(&settings);
    info!("Device ready on {} MHz", settings.channel);

    // Upstream UART (host side)
    let msp_config = uart_config(&UartConfig::default());
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, msp_config);
    let uart = uart.into_buffered(
        Irqs,
        UP_TX_BUF.init([0u8; UART_BUF_SIZE]),
        UP_RX_BUF.init([0u8; UART_BUF_SIZE]),
    );
    let (up_tx, up_rx) = uart.split();

    // Downstream UART (next node in the chain)
    let msp_config = uart_config(&UartConfig::default());
    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, msp_config);
    let uart = uart.into_buffered(
        Irqs,
        DOWN_TX_BUF.init([0u8; UART_BUF_SIZE]),
        DOWN_RX_BUF.init([0u8; UART_BUF_SIZE]),
    );
    let (down_tx, down_rx) = uart.split();

    info!("MSP UARTs initialized");

    // RSSI input from the video receiver
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let rssi_channel = Channel::new_pin(p.PIN_26, embassy_rp::gpio::Pull::None);
    let rssi = RssiAdc::new(adc, rssi_channel);

    unwrap!(spawner.spawn(tasks::upstream_rx_task(up_rx)));
    unwrap!(spawner.spawn(tasks::upstream_tx_task(up_tx)));
    unwrap!(spawner.spawn(tasks::downstream_rx_task(down_rx)));
    unwrap!(spawner.spawn(tasks::downstream_tx_task(down_tx)));
    unwrap!(spawner.spawn(tasks::rssi_task(rssi)));
    unwrap!(spawner.spawn(tasks::storage_task(persistence)));

    info!("All tasks spawned");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Load settings from flash storage
///
/// Returns the settings to start from and the persistence manager, which the
/// storage task keeps for later writes.
async fn load_settings_from_flash(
    flash: Peri<'static, FLASH>,
    dma: Peri<'static, DMA_CH0>,
) -> (Settings, SettingsPersistence<'static>) {
    let flash_storage = FlashStorage::new(flash, dma);
    let mut persistence = SettingsPersistence::new(flash_storage);
    let settings = persistence.load_or_default().await;
    (settings, persistence)
}
