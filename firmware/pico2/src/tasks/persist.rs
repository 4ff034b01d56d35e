//! Settings write-back task.
//!
//! Must run on core 0: embassy-rp pauses core 1 during flash writes.

use defmt::{error, info};
use eyes_pico2::store::{self, DOCUMENT_CAPACITY};

use crate::channels::{PERSIST, SharedSettings};
use crate::storage::SettingsStore;

/// Write the settings to flash after every signalled change.
///
/// Bursts of commands coalesce: the signal holds at most one pending write and
/// the document is encoded from the state at write time.
#[embassy_executor::task]
pub async fn persist_task(
    mut settings_store: SettingsStore<'static>,
    settings: &'static SharedSettings,
) {
    info!("Persist task started");

    loop {
        PERSIST.wait().await;

        let Ok(document) = settings.lock(|cell| store::encode(&cell.borrow())) else {
            error!("Settings exceed {} bytes, not saved", DOCUMENT_CAPACITY);
            continue;
        };

        match settings_store.save(&document).await {
            Ok(()) => info!("Settings saved ({} bytes)", document.len()),
            Err(e) => error!("Settings write failed: {}", e),
        }
    }
}
