//! Host command link over UART0.
//!
//! The RX task frames incoming bytes into lines and dispatches them as
//! commands. The TX task sends the startup settings dump, then drains
//! [`OUTBOX`] forever.

use defmt::{debug, info, warn};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};
use eyes_common::commands::{self, Effect};
use eyes_common::config::{QUERY_DUMP_PREFIX, STARTUP_DUMP_PREFIX};
use eyes_common::settings::Scope;
use eyes_pico2::link::{LineBuffer, OutLine, TX_LINE_CAPACITY, frame_line, leaf_line};

use crate::channels::{BACKLIGHT, HANDSHAKE_COMPLETE, OUTBOX, SharedSettings, mark_changed};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - reads command lines from the host.
#[embassy_executor::task]
pub async fn link_rx_task(
    mut rx: BufferedUartRx,
    settings: &'static SharedSettings,
) {
    info!("Link RX task started");

    let mut lines = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match lines.push(byte) {
                Some(Ok(line)) if !line.is_empty() => handle_line(line, settings).await,
                Some(Err(e)) => warn!("Dropped line: {}", e),
                _ => {}
            }
        }
    }
}

/// Apply one command line and carry out its effect.
async fn handle_line(
    line: &str,
    settings: &'static SharedSettings,
) {
    // Check and mutation happen under one lock
    let result = settings.lock(|cell| commands::handle_line(&mut cell.borrow_mut(), line));

    let effect = match result {
        Ok(effect) => effect,
        Err(e) => {
            warn!("Rejected {=str}: {}", line, e);
            return;
        }
    };
    debug!("{=str} -> {}", line, effect);

    if effect.persists() {
        mark_changed();
    }

    match effect {
        Effect::Saved => {}
        Effect::Backlight(percent) => BACKLIGHT.signal(percent),
        Effect::DumpSettings => send_dump(settings, QUERY_DUMP_PREFIX).await,
        Effect::HandshakeComplete => HANDSHAKE_COMPLETE.signal(()),
    }
}

/// Dump line `index`: `None` past the last leaf, `Some(None)` if it does not fit a line.
///
/// Leaves are formatted one at a time under the lock so no full settings copy
/// is held across awaits.
fn dump_line(
    settings: &SharedSettings,
    prefix: &str,
    index: usize,
) -> Option<Option<OutLine>> {
    settings.lock(|cell| {
        cell.borrow()
            .leaves(Scope::Dump)
            .nth(index)
            .map(|leaf| leaf_line(prefix, &leaf))
    })
}

/// Queue every dumpable leaf for the TX task.
async fn send_dump(
    settings: &SharedSettings,
    prefix: &str,
) {
    for index in 0.. {
        match dump_line(settings, prefix, index) {
            Some(Some(line)) => OUTBOX.send(line).await,
            Some(None) => warn!("Settings leaf {} too long for the link", index),
            None => break,
        }
    }
}

/// Link TX task - writes the startup dump, then queued lines.
#[embassy_executor::task]
pub async fn link_tx_task(
    mut tx: BufferedUartTx,
    settings: &'static SharedSettings,
) {
    info!("Link TX task started");

    for index in 0.. {
        match dump_line(settings, STARTUP_DUMP_PREFIX, index) {
            Some(Some(line)) => write_line(&mut tx, &line).await,
            Some(None) => warn!("Settings leaf {} too long for the link", index),
            None => break,
        }
    }

    loop {
        let line = OUTBOX.receive().await;
        write_line(&mut tx, &line).await;
    }
}

async fn write_line(
    tx: &mut BufferedUartTx,
    line: &OutLine,
) {
    let mut framed = heapless::String::<{ TX_LINE_CAPACITY + 1 }>::new();
    if frame_line(line, &mut framed).is_err() {
        return;
    }
    if let Err(e) = tx.write_all(framed.as_bytes()).await {
        warn!("UART write error: {:?}", e);
    }
}
