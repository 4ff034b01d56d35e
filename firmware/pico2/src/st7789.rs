//! Async ST7789 driver for the two 240x240 eye panels, with double buffering.
//!
//! # Architecture
//!
//! - [`DoubleBuffer`]: two static RGB565 framebuffers; the scheduler composes
//!   into one while the other is being flushed
//! - [`St7789Flusher`]: owns one panel's SPI peripheral and control pins,
//!   handles async DMA transfers
//!
//! Drawing goes through [`eyes_common::Framebuffer`], so this module only
//! moves bytes. Both panels receive the same frame.
//!
//! # Panel geometry
//!
//! The 240x240 panels sit in a 240x320 controller RAM. They are mounted
//! upside down, so the driver rotates 180° and skips the first 80 rows.

use embassy_rp::gpio::Output;
use embassy_rp::spi::{Async, Instance, Spi};
use embassy_time::Timer;
use eyes_common::config::{FRAME_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH};

// One eye frame each; both panels show whichever was handed to the flush task.
static mut FRAME_A: [u8; FRAME_BYTES] = [0u8; FRAME_BYTES];
static mut FRAME_B: [u8; FRAME_BYTES] = [0u8; FRAME_BYTES];

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL flags
const MADCTL_MY: u8 = 0x80; // Row address order
const MADCTL_MX: u8 = 0x40; // Column address order

/// Rows of controller RAM above the visible area after the 180° rotation.
const ROW_OFFSET: u16 = 80;

/// Tracks which of the two eye frames the scheduler is composing into.
pub struct DoubleBuffer {
    composing: usize,
}

impl DoubleBuffer {
    /// # Safety
    /// At most one instance may exist; it hands out the static frames.
    pub unsafe fn new() -> Self { Self { composing: 0 } }

    /// Frame the scheduler composes into.
    ///
    /// # Safety
    /// The frame last returned by [`Self::swap`] must not be passed here
    /// until its flush has completed.
    #[inline]
    pub unsafe fn render_buffer(&mut self) -> &'static mut [u8] {
        match self.composing {
            0 => unsafe { &mut *core::ptr::addr_of_mut!(FRAME_A) },
            _ => unsafe { &mut *core::ptr::addr_of_mut!(FRAME_B) },
        }
    }

    /// Composed frame `index`, as handed out by [`Self::swap`].
    ///
    /// # Safety
    /// The scheduler must not be composing into this frame.
    #[inline]
    pub unsafe fn get_buffer(index: usize) -> &'static [u8] {
        match index {
            0 => unsafe { &*core::ptr::addr_of!(FRAME_A) },
            _ => unsafe { &*core::ptr::addr_of!(FRAME_B) },
        }
    }

    /// Hand the composed frame over for flushing and compose into the other.
    #[inline]
    pub fn swap(&mut self) -> usize {
        let composed = self.composing;
        self.composing ^= 1;
        composed
    }
}

/// One ST7789 panel: SPI peripheral plus DC, CS and reset lines.
pub struct St7789Flusher<'d, T: Instance> {
    spi: Spi<'d, T, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
    rst: Output<'d>,
}

impl<'d, T: Instance> St7789Flusher<'d, T> {
    pub fn new(
        spi: Spi<'d, T, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
        rst: Output<'d>,
    ) -> Self {
        Self { spi, dc, cs, rst }
    }

    /// Reset and initialize the panel.
    pub async fn init(&mut self) {
        // Hardware reset pulse
        self.rst.set_low();
        Timer::after_millis(10).await;
        self.rst.set_high();
        Timer::after_millis(120).await;

        self.write_command(SWRESET).await;
        Timer::after_millis(150).await;

        self.write_command(SLPOUT).await;
        Timer::after_millis(10).await;

        // RGB565
        self.write_command(COLMOD).await;
        self.write_data(&[0x55]).await;

        // 180° rotation
        self.write_command(MADCTL).await;
        self.write_data(&[MADCTL_MY | MADCTL_MX]).await;

        self.write_command(INVON).await;
        Timer::after_millis(10).await;

        self.write_command(NORON).await;
        Timer::after_millis(10).await;

        self.write_command(DISPON).await;
        Timer::after_millis(10).await;

        // Pre-set window to the visible area for flush
        self.set_window(0, ROW_OFFSET, SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16)
            .await;
    }

    /// Send a command byte (DC low, CS low during transfer).
    async fn write_command(
        &mut self,
        cmd: u8,
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.write(&[cmd]).await.ok();
        self.cs.set_high();
    }

    /// Send data bytes (DC high, CS low during transfer).
    async fn write_data(
        &mut self,
        data: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(data).await.ok();
        self.cs.set_high();
    }

    async fn set_window(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) {
        let x1 = x + w - 1;
        let y1 = y + h - 1;

        self.write_command(CASET).await;
        self.write_data(&[(x >> 8) as u8, x as u8, (x1 >> 8) as u8, x1 as u8])
            .await;

        self.write_command(RASET).await;
        self.write_data(&[(y >> 8) as u8, y as u8, (y1 >> 8) as u8, y1 as u8])
            .await;
    }

    /// Flush a frame via async DMA. The window was set during `init()`.
    pub async fn flush_buffer(
        &mut self,
        buffer: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_low();
        // Blocking write for the single command byte (faster than DMA setup)
        self.spi.blocking_write(&[RAMWR]).ok();
        self.dc.set_high();
        self.spi.write(buffer).await.ok();
        self.cs.set_high();
    }
}
