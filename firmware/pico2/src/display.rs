//! Pin mapping and SPI setup for the two ST7789 240x240 eye panels.
//!
//! | Signal | Left eye (SPI0) | Right eye (SPI1) |
//! |--------|-----------------|------------------|
//! | CLK    | GPIO18          | GPIO10           |
//! | MOSI   | GPIO19          | GPIO11           |
//! | CS     | GPIO17          | GPIO13           |
//! | DC     | GPIO16          | GPIO12           |
//! | RST    | GPIO21          | GPIO14           |
//!
//! Backlight of both panels: GPIO20 (PWM slice 2, channel A).
//! Host link: UART0 on GPIO0 (TX) / GPIO1 (RX).

use embassy_rp::spi::Config as SpiConfig;

/// Host link baud rate.
pub const LINK_BAUDRATE: u32 = 115_200;

/// The ST7789 is specified up to 62.5MHz SPI clock.
const MAX_SPI_HZ: u32 = 62_500_000;

/// SPI configuration for the panels at the configured clock.
pub fn display_spi_config(frequency_hz: u32) -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = frequency_hz.clamp(1_000_000, MAX_SPI_HZ);
    config
}
