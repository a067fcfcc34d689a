//! UART configuration for the RP2040 MSP ports

use embassy_rp::uart::{Config, Parity as RpParity, StopBits as RpStopBits};
use racelap_hal::uart::{Parity, StopBits, UartConfig};

/// Build the embassy UART config for an MSP port
pub fn uart_config(config: &UartConfig) -> Config {
    let mut out = Config::default();
    out.baudrate = config.baudrate;
    out.parity = match config.parity {
        Parity::None => RpParity::ParityNone,
        Parity::Even => RpParity::ParityEven,
        Parity::Odd => RpParity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => RpStopBits::STOP1,
        StopBits::Two => RpStopBits::STOP2,
    };
    out
}
