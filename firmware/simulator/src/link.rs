//! Command link over stdin/stdout.

use std::io::{self, BufRead, Write};
use std::sync::PoisonError;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Receiver;

use eyes_common::commands::{self, Effect};
use eyes_common::config::QUERY_DUMP_PREFIX;
use log::{debug, error, info, warn};

use crate::shared::Shared;
use crate::store;

/// Apply one command line and carry out its effect.
pub fn handle_line(
    shared: &Shared,
    line: &str,
) {
    let effect = {
        // Check, mutation and save share one write lock
        let mut settings = shared.settings.write().unwrap_or_else(PoisonError::into_inner);
        let effect = match commands::handle_line(&mut settings, line) {
            Ok(effect) => effect,
            Err(e) => {
                warn!("rejected {line:?}: {e}");
                return;
            }
        };
        if effect.persists()
            && let Err(e) = store::save(&shared.settings_path, &settings)
        {
            error!("saving settings: {e:#}");
        }
        effect
    };
    debug!("{line:?} -> {effect:?}");

    match effect {
        Effect::Saved => {}
        Effect::Backlight(percent) => info!("backlight {percent}%"),
        Effect::DumpSettings => shared.send_dump(QUERY_DUMP_PREFIX),
        Effect::HandshakeComplete => shared.handshake.store(true, Ordering::Release),
    }
}

/// Command thread body: one command per stdin line until EOF.
pub fn read_commands(shared: &Shared) {
    info!("command reader started");
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) => {
                let line = line.trim_end_matches('\r');
                if !line.is_empty() {
                    handle_line(shared, line);
                }
            }
            Err(e) => warn!("stdin: {e}"),
        }
    }
    info!("stdin closed, command reader stopped");
}

/// Writer thread body: print queued lines until every sender is gone.
pub fn write_lines(outbox: &Receiver<String>) {
    let stdout = io::stdout();
    for line in outbox {
        let mut out = stdout.lock();
        if writeln!(out, "{line}").and_then(|()| out.flush()).is_err() {
            warn!("stdout closed, dropping further output");
            return;
        }
    }
}
