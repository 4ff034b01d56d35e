//! State shared between the simulator threads.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use eyes_common::settings::{Leaf, Scope, write_prefixed};
use eyes_common::{EyePosition, Settings};

/// Handles cloned into every thread.
#[derive(Clone)]
pub struct Shared {
    /// Settings tree; written only by the command thread.
    pub settings: Arc<RwLock<Settings>>,
    /// Latest eye position; written only by the motion thread.
    pub eye: Arc<Mutex<EyePosition>>,
    /// Set by `handshake.complete`, consumed by the scheduler.
    pub handshake: Arc<AtomicBool>,
    /// Lines for stdout.
    pub outbox: Sender<String>,
    /// Settings file rewritten after every mutation.
    pub settings_path: Arc<PathBuf>,
}

impl Shared {
    pub fn new(
        settings: Settings,
        outbox: Sender<String>,
        settings_path: PathBuf,
    ) -> Self {
        let eye = EyePosition::from_point(settings.motions.center_point);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            eye: Arc::new(Mutex::new(eye)),
            handshake: Arc::new(AtomicBool::new(false)),
            outbox,
            settings_path: Arc::new(settings_path),
        }
    }

    /// Copy of the current settings. A poisoned lock still holds valid data.
    pub fn snapshot(&self) -> Settings { self.settings.read().unwrap_or_else(PoisonError::into_inner).clone() }

    pub fn eye(&self) -> EyePosition { *self.eye.lock().unwrap_or_else(PoisonError::into_inner) }

    pub fn set_eye(
        &self,
        position: EyePosition,
    ) {
        *self.eye.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }

    /// Take a pending handshake, if any.
    pub fn take_handshake(&self) -> bool { self.handshake.swap(false, Ordering::AcqRel) }

    /// Queue one line for stdout. Dropped silently once the writer is gone.
    pub fn send(
        &self,
        line: String,
    ) {
        self.outbox.send(line).ok();
    }

    /// Queue every dumpable leaf with `prefix`.
    pub fn send_dump(
        &self,
        prefix: &str,
    ) {
        let settings = self.snapshot();
        for leaf in settings.leaves(Scope::Dump) {
            self.send(prefixed(prefix, &leaf));
        }
    }
}

fn prefixed(
    prefix: &str,
    leaf: &Leaf,
) -> String {
    let mut line = String::new();
    // Writing into a String cannot fail
    write_prefixed(&mut line, prefix, leaf).ok();
    line
}
