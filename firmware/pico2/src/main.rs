//! Robot eye firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Drives two ST7789 240x240 panels as a pair of eyes, controlled by a host
//! over a UART line protocol.
//!
//! # Architecture
//!
//! - Core 0: frame scheduler loop (this task), display flush, settings
//!   write-back, backlight PWM
//! - Core 1: motion generator, UART command link
//!
//! Frames are double buffered: the scheduler composes into one buffer while
//! the flush task DMAs the other to both panels.

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod channels;
mod display;
mod st7789;
mod storage;
mod tasks;

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_executor::{Executor, Spawner};
use embassy_futures::join::join;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::multicore::{Stack, spawn_core1};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::spi::Spi;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker};
use embedded_graphics::prelude::Size;
use eyes_common::assets::ProceduralAssets;
use eyes_common::config::{HANDSHAKE_REQUEST, SCREEN_HEIGHT, SCREEN_WIDTH, TICK_MS};
use eyes_common::{EyePosition, FrameScheduler, Framebuffer, Settings, TickInput};
use eyes_pico2::link::text_line;
use eyes_pico2::store;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::channels::{EYE_POSITION, HANDSHAKE_COMPLETE, OUTBOX, SharedSettings, settings_version, snapshot};
use crate::display::{LINK_BAUDRATE, display_spi_config};
use crate::st7789::{DoubleBuffer, St7789Flusher};
use crate::storage::SettingsStore;
use crate::tasks::backlight::backlight_config;
use crate::tasks::{
    FLUSH_DONE,
    FLUSH_SIGNAL,
    LeftPanel,
    RightPanel,
    backlight_task,
    display_flush_task,
    link_rx_task,
    link_tx_task,
    motion_task,
    persist_task,
};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-robot-eyes"),
    embassy_rp::binary_info::rp_program_description!(c"Robot eyes on two ST7789 240x240 panels"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

// UART buffers and task-owned state (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static SETTINGS: StaticCell<SharedSettings> = StaticCell::new();
static LEFT_PANEL: StaticCell<LeftPanel> = StaticCell::new();
static RIGHT_PANEL: StaticCell<RightPanel> = StaticCell::new();

// Core 1
static mut CORE1_STACK: Stack<8192> = Stack::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

#[inline]
fn now_ms() -> u64 { Instant::now().as_millis() }

/// Stored settings, or defaults written back on first boot.
async fn load_settings(settings_store: &mut SettingsStore<'_>) -> Settings {
    match settings_store.load().await {
        Ok(Some(settings)) => {
            info!("Settings loaded from flash");
            settings
        }
        Ok(None) => {
            info!("No stored settings, writing defaults");
            let defaults = Settings::default();
            match store::encode(&defaults) {
                Ok(document) => {
                    if let Err(e) = settings_store.save(&document).await {
                        warn!("Could not store defaults: {}", e);
                    }
                }
                Err(_) => warn!("Default settings do not fit a record"),
            }
            defaults
        }
        Err(e) => defmt::panic!("Stored settings unusable: {}", e),
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Robot eyes starting");

    let mut settings_store = SettingsStore::new(p.FLASH, p.DMA_CH2);
    let settings = load_settings(&mut settings_store).await;

    let spi_hz = settings.display.speed;
    let backlight = settings.display.backlight;
    let center = EyePosition::from_point(settings.motions.center_point);
    let shared: &'static SharedSettings = SETTINGS.init(Mutex::new(RefCell::new(settings)));

    // Backlight for both panels: PWM slice 2 channel A
    let pwm = Pwm::new_output_a(p.PWM_SLICE2, p.PIN_20, backlight_config(backlight));
    info!("Backlight {}%", backlight);

    // Initialize async SPI with DMA (TX-only, panels don't need MISO)
    let left_spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, display_spi_config(spi_hz));
    let mut left = St7789Flusher::new(
        left_spi,
        Output::new(p.PIN_16, Level::Low),
        Output::new(p.PIN_17, Level::High),
        Output::new(p.PIN_21, Level::High),
    );
    let right_spi = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH1, display_spi_config(spi_hz));
    let mut right = St7789Flusher::new(
        right_spi,
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_13, Level::High),
        Output::new(p.PIN_14, Level::High),
    );
    join(left.init(), right.init()).await;
    info!("Panels initialized, SPI {} Hz", spi_hz);

    // SAFETY: Only one DoubleBuffer instance exists
    let mut double_buffer = unsafe { DoubleBuffer::new() };

    // Move flushers to static for the task (Embassy tasks need 'static lifetime)
    let left: &'static mut LeftPanel = LEFT_PANEL.init(left);
    let right: &'static mut RightPanel = RIGHT_PANEL.init(right);

    spawner.spawn(display_flush_task(left, right)).unwrap();
    spawner.spawn(persist_task(settings_store, shared)).unwrap();
    spawner.spawn(backlight_task(pwm)).unwrap();
    info!("Core 0 tasks spawned");

    // Host link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = LINK_BAUDRATE;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let (tx, rx) = uart.into_buffered(Irqs, tx_buf, rx_buf).split();

    spawn_core1(
        p.CORE1,
        // SAFETY: the stack is handed to core 1 once and never touched again
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| {
                spawner.spawn(motion_task(EYE_POSITION.dyn_sender(), shared)).unwrap();
                spawner.spawn(link_rx_task(rx, shared)).unwrap();
                spawner.spawn(link_tx_task(tx, shared)).unwrap();
            })
        },
    );
    info!("Core 1 tasks spawned");

    let mut eye_receiver = EYE_POSITION.dyn_receiver().unwrap();
    let mut scheduler = FrameScheduler::new(ProceduralAssets::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)), now_ms());
    let mut local = snapshot(shared);
    let mut seen_version = settings_version();
    let mut eye = center;
    let mut flush_in_progress = false;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    info!("Scheduler loop starting");

    loop {
        let version = settings_version();
        if version != seen_version {
            local = snapshot(shared);
            seen_version = version;
        }
        if let Some(position) = eye_receiver.try_changed() {
            eye = position;
        }

        // SAFETY: the flush task only reads the buffer handed over by swap()
        let buffer = unsafe { double_buffer.render_buffer() };
        let Some(mut framebuffer) = Framebuffer::new(buffer, SCREEN_WIDTH, SCREEN_HEIGHT) else {
            defmt::panic!("Framebuffer smaller than the panel");
        };

        let input = TickInput {
            now_ms: now_ms(),
            settings: &local,
            eye,
            handshake_complete: HANDSHAKE_COMPLETE.try_take().is_some(),
        };
        let Ok(report) = scheduler.tick(&input, &mut framebuffer);

        if report.mode_changed {
            info!("Display mode: {}", report.mode);
        }
        if report.request_handshake && text_line(HANDSHAKE_REQUEST).is_some_and(|line| OUTBOX.try_send(line).is_err()) {
            warn!("Outbox full, handshake request dropped");
        }
        if report.frame_ready {
            if flush_in_progress {
                FLUSH_DONE.wait().await;
            }
            FLUSH_SIGNAL.signal(double_buffer.swap());
            flush_in_progress = true;
        }

        ticker.next().await;
    }
}
