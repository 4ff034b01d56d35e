//! Display flush task for parallel rendering and DMA transfers.
//!
//! Receives signals from the scheduler loop and writes the completed
//! framebuffer to both panels at once while the loop composes into the other
//! buffer.

use core::sync::atomic::{AtomicU32, Ordering};

use defmt::{debug, info};
use embassy_futures::join::join;
use embassy_rp::peripherals::{SPI0, SPI1};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;

use crate::st7789::{DoubleBuffer, St7789Flusher};

/// Left eye panel.
pub type LeftPanel = St7789Flusher<'static, SPI0>;
/// Right eye panel.
pub type RightPanel = St7789Flusher<'static, SPI1>;

/// Signal to notify flush task which buffer to flush (buffer index).
pub static FLUSH_SIGNAL: Signal<CriticalSectionRawMutex, usize> = Signal::new();

/// Signal to notify the scheduler loop that flush is complete.
pub static FLUSH_DONE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Frames pushed since boot.
static FRAMES_PUSHED: AtomicU32 = AtomicU32::new(0);

/// Display flush task - mirrors every frame to both panels.
#[embassy_executor::task]
pub async fn display_flush_task(
    left: &'static mut LeftPanel,
    right: &'static mut RightPanel,
) {
    info!("Display flush task started");

    loop {
        let buffer_idx = FLUSH_SIGNAL.wait().await;
        let flush_start = Instant::now();

        // SAFETY: the scheduler is composing into the OTHER buffer until FLUSH_DONE
        let buffer = unsafe { DoubleBuffer::get_buffer(buffer_idx) };

        join(left.flush_buffer(buffer), right.flush_buffer(buffer)).await;

        let frames = FRAMES_PUSHED.fetch_add(1, Ordering::Relaxed) + 1;
        if frames.is_multiple_of(500) {
            debug!("{} frames pushed, last flush {} us", frames, flush_start.elapsed().as_micros());
        }

        FLUSH_DONE.signal(());
    }
}
