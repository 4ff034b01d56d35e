//! State shared between the tasks on both cores.
//!
//! Everything uses `CriticalSectionRawMutex`, which is safe across the two
//! RP2350 cores.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_sync::watch::Watch;
use eyes_common::{EyePosition, Settings};
use eyes_pico2::link::OutLine;

/// Settings tree. Mutated only by the command dispatcher, inside one lock.
pub type SharedSettings = Mutex<CriticalSectionRawMutex, RefCell<Settings>>;

/// Outgoing lines waiting for the UART.
const OUTBOX_DEPTH: usize = 8;

/// Bumped after every settings mutation so readers know to refresh their copy.
pub static SETTINGS_VERSION: AtomicU32 = AtomicU32::new(0);

/// Latest eye position from the motion task.
pub static EYE_POSITION: Watch<CriticalSectionRawMutex, EyePosition, 1> = Watch::new();

/// Raised by the dispatcher on `handshake.complete`.
pub static HANDSHAKE_COMPLETE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// New backlight percentage for the PWM owner.
pub static BACKLIGHT: Signal<CriticalSectionRawMutex, u8> = Signal::new();

/// Settings changed and should be written to flash.
pub static PERSIST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Lines for the host: handshake requests and settings dumps.
pub static OUTBOX: Channel<CriticalSectionRawMutex, OutLine, OUTBOX_DEPTH> = Channel::new();

/// Copy of the current settings.
pub fn snapshot(shared: &SharedSettings) -> Settings { shared.lock(|cell| cell.borrow().clone()) }

/// Record a settings mutation.
pub fn mark_changed() {
    SETTINGS_VERSION.fetch_add(1, Ordering::Release);
    PERSIST.signal(());
}

/// Current settings version.
#[inline]
pub fn settings_version() -> u32 { SETTINGS_VERSION.load(Ordering::Acquire) }
