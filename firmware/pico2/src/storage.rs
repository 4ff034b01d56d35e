//! Flash-backed settings store.
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 64KB of flash. One key holds the flattened settings document.

use embassy_rp::Peri;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use eyes_common::Settings;
use eyes_pico2::store::{self, DOCUMENT_CAPACITY, DecodeError, Document};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, Key, SerializationError};

/// Flash size of the Pico 2.
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;
const STORE_SIZE: usize = 64 * 1024;

/// Flash range for the settings partition.
const STORE_RANGE: core::ops::Range<u32> = ((FLASH_SIZE - STORE_SIZE) as u32)..(FLASH_SIZE as u32);

/// Work buffer: one document plus item header room.
const RECORD_BUFFER: usize = DOCUMENT_CAPACITY + 64;

/// Storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum StorageKey {
    /// Flattened settings text.
    Settings = 0,
}

impl Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, SerializationError> {
        let slot = buffer.first_mut().ok_or(SerializationError::BufferTooSmall)?;
        *slot = *self as u8;
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        match buffer.first() {
            Some(0) => Ok((Self::Settings, 1)),
            Some(_) => Err(SerializationError::InvalidFormat),
            None => Err(SerializationError::BufferTooSmall),
        }
    }
}

/// Errors from the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum StoreError {
    /// Flash or map operation failed.
    Storage,
    /// A record exists but does not decode.
    Corrupted(DecodeError),
}

/// Settings persistence on the on-board flash.
pub struct SettingsStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    buffer: [u8; RECORD_BUFFER],
}

impl<'d> SettingsStore<'d> {
    pub fn new(
        flash: Peri<'d, FLASH>,
        dma: Peri<'d, impl Channel>,
    ) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            buffer: [0u8; RECORD_BUFFER],
        }
    }

    /// Read the stored settings. `Ok(None)` on first boot.
    pub async fn load(&mut self) -> Result<Option<Settings>, StoreError> {
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &StorageKey::Settings,
        )
        .await
        .map_err(|_| StoreError::Storage)?;

        item.map(|bytes| store::decode(bytes).map_err(StoreError::Corrupted))
            .transpose()
    }

    /// Replace the stored settings.
    pub async fn save(
        &mut self,
        document: &Document,
    ) -> Result<(), StoreError> {
        map::store_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            &StorageKey::Settings,
            &document.as_bytes(),
        )
        .await
        .map_err(|_| StoreError::Storage)
    }
}
