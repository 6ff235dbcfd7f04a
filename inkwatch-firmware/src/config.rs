//! Boot-time configuration and battery log recovery
//!
//! Configuration comes from the postcard blob saved in flash, else the
//! embedded watch.toml, else built-in defaults.

use defmt::*;

use inkwatch_core::battery::{BlockRing, LOG_SLOTS};
use inkwatch_core::config::toml::parse_config;
use inkwatch_core::config::WatchConfig;
use inkwatch_hal::flash::{FlashError, FlashStorage, StorageKey};

/// Embedded default configuration (compiled into firmware)
/// Edit watch.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../watch.toml");

/// Maximum serialized config size
const MAX_CONFIG_SIZE: usize = 128;

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Bad magic, version or values
    Invalid,
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

/// Load the configuration, never failing
pub async fn load_config<S: FlashStorage>(storage: &mut S) -> WatchConfig {
    match load_saved(storage).await {
        Ok(config) => {
            info!("Loaded configuration from flash");
            return config;
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            debug!("No saved configuration, using watch.toml");
        }
        Err(e) => {
            warn!("Saved configuration unusable: {:?}, using watch.toml", e);
        }
    }

    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            // Only reachable if watch.toml slipped past build.rs validation
            error!("Failed to parse embedded config: {:?}", e);
            WatchConfig::default()
        }
    }
}

async fn load_saved<S: FlashStorage>(storage: &mut S) -> Result<WatchConfig, ConfigError> {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let len = storage.read(StorageKey::Config, &mut buffer).await?;

    let config: WatchConfig =
        postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;

    if !config.is_valid() {
        return Err(ConfigError::Invalid);
    }
    Ok(config)
}

/// Find the battery log blocks left in flash and resume after the newest
pub async fn resume_log<S: FlashStorage>(storage: &mut S) -> BlockRing {
    let mut present: heapless::Vec<u8, { LOG_SLOTS as usize }> = heapless::Vec::new();
    for slot in 0..LOG_SLOTS {
        if storage.exists(StorageKey::BatteryLog(slot)).await {
            // One entry per slot
            let _ = present.push(slot);
        }
    }
    debug!("{} battery log blocks in flash", present.len());
    BlockRing::resume(present)
}
