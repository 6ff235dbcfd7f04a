//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash.
//!
//! Implements the `FlashStorage` trait from `inkwatch-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use inkwatch_hal::flash::{FlashError, StorageKey};

/// 2MB flash on Pico boards
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
pub const STORAGE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORAGE_PARTITION_START: usize = FLASH_SIZE - STORAGE_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the storage partition
pub const STORAGE_RANGE: core::ops::Range<u32> =
    (STORAGE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Largest value stored under one key
const ITEM_BUFFER_SIZE: usize = 512;

/// Key/value store on the storage partition
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Look up `key`, copying its value into `out`
    async fn fetch(&mut self, key: StorageKey, out: &mut [u8]) -> Result<usize, FlashError> {
        let mut scratch = [0u8; ITEM_BUFFER_SIZE];
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &key,
        )
        .await
        .map_err(storage_error)?
        .ok_or(FlashError::NotFound)?;

        let dest = out.get_mut(..item.len()).ok_or(FlashError::BufferTooSmall)?;
        dest.copy_from_slice(item);
        Ok(item.len())
    }
}

fn storage_error<E>(e: sequential_storage::Error<E>) -> FlashError {
    match e {
        sequential_storage::Error::Corrupted { .. } => FlashError::Corrupted,
        sequential_storage::Error::FullStorage => FlashError::Full,
        sequential_storage::Error::Storage { .. } => FlashError::Flash,
        _ => FlashError::Storage,
    }
}

impl<'d> inkwatch_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        self.fetch(key, buffer).await
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut scratch = [0u8; ITEM_BUFFER_SIZE];
        map::store_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &key,
            &data,
        )
        .await
        .map_err(storage_error)
    }

    async fn remove(&mut self, key: StorageKey) -> Result<(), FlashError> {
        let mut scratch = [0u8; ITEM_BUFFER_SIZE];
        map::remove_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &key,
        )
        .await
        .map_err(storage_error)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        // Battery log blocks are the largest values
        let mut probe = [0u8; ITEM_BUFFER_SIZE];
        self.fetch(key, &mut probe).await.is_ok()
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(STORAGE_PARTITION_START as u32, FLASH_SIZE as u32)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
