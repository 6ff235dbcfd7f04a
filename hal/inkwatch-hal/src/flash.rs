//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Number of battery log slots (keys wrap at this index)
pub const BATTERY_LOG_SLOTS: u8 = 100;

const TAG_CONFIG: u8 = 0;
const TAG_BATTERY_LOG: u8 = 1;

/// Storage keys
///
/// Serialized as two bytes: `[tag][index]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageKey {
    /// Watch configuration (binary postcard format)
    Config,
    /// One block of battery voltage samples, slot 0..=99
    BatteryLog(u8),
}

impl StorageKey {
    /// Encode as `[tag, index]`
    pub fn to_bytes(self) -> [u8; 2] {
        match self {
            StorageKey::Config => [TAG_CONFIG, 0],
            StorageKey::BatteryLog(index) => [TAG_BATTERY_LOG, index],
        }
    }

    /// Decode from `[tag, index]`
    pub fn from_bytes(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            [TAG_CONFIG, 0] => Some(StorageKey::Config),
            [TAG_BATTERY_LOG, index] if index < BATTERY_LOG_SLOTS => {
                Some(StorageKey::BatteryLog(index))
            }
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Flash storage trait
///
/// Wear-leveled key-value storage for configuration and battery logs.
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write (append) a value by key, replacing any previous value
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&mut self, key: StorageKey)
        -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Erase all stored data
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.len() < 2 {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[..2].copy_from_slice(&self.to_bytes());
        Ok(2)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.len() < 2 {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_bytes([buffer[0], buffer[1]]) {
            Some(key) => Ok((key, 2)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
