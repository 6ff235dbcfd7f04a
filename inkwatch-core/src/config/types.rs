//! Configuration type definitions
//!
//! These types represent the watch configuration. Configuration is stored
//! in flash as postcard-serialized binary data.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum advertised device name length
pub const MAX_NAME_LEN: usize = 16;

/// Configuration blob magic ("INKW")
pub const CONFIG_MAGIC: u32 = 0x494E_4B57;

/// Configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Vibration burst: the motor pin toggles `toggles` times, `interval_ms` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VibrationPattern {
    pub interval_ms: u16,
    pub toggles: u8,
}

impl VibrationPattern {
    pub const fn new(interval_ms: u16, toggles: u8) -> Self {
        Self {
            interval_ms,
            toggles,
        }
    }

    /// Total duration of the burst in milliseconds
    pub fn duration_ms(&self) -> u32 {
        u32::from(self.interval_ms) * u32::from(self.toggles)
    }
}

/// Vibration patterns per alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VibrationConfig {
    /// Regular notification
    pub notification: VibrationPattern,
    /// Incoming call (also repeated once while ringing)
    pub call: VibrationPattern,
    /// Companion app asked the watch to make itself noticed
    pub find: VibrationPattern,
}

impl Default for VibrationConfig {
    fn default() -> Self {
        Self {
            notification: VibrationPattern::new(75, 4),
            call: VibrationPattern::new(250, 8),
            find: VibrationPattern::new(150, 12),
        }
    }
}

/// Battery voltage calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatteryCalibration {
    /// Voltage reported as 0%
    pub empty_mv: u16,
    /// Voltage reported as 100%
    pub full_mv: u16,
}

impl Default for BatteryCalibration {
    fn default() -> Self {
        Self {
            empty_mv: 3400,
            full_mv: 4200,
        }
    }
}

impl BatteryCalibration {
    /// Usable voltage span, never zero
    pub fn range_mv(&self) -> u16 {
        self.full_mv.saturating_sub(self.empty_mv).max(1)
    }
}

/// Complete watch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchConfig {
    /// Magic number for validation
    pub magic: u32,
    /// Layout version
    pub version: u8,
    /// Name advertised to the companion app
    pub device_name: String<MAX_NAME_LEN>,
    pub battery: BatteryCalibration,
    /// Button settle time
    pub debounce_ms: u16,
    /// Maximum time the main loop waits for an event before idle work
    pub idle_timeout_s: u16,
    pub vibration: VibrationConfig,
    /// Offset applied to time-sync values, in minutes
    pub timezone_offset_min: i16,
}

impl Default for WatchConfig {
    fn default() -> Self {
        let mut device_name = String::new();
        // Fits MAX_NAME_LEN
        let _ = device_name.push_str("Inkwatch");
        Self {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            device_name,
            battery: BatteryCalibration::default(),
            debounce_ms: 64,
            idle_timeout_s: 60,
            vibration: VibrationConfig::default(),
            timezone_offset_min: 0,
        }
    }
}

impl WatchConfig {
    /// Check the magic and version of a loaded blob
    pub fn is_valid(&self) -> bool {
        self.magic == CONFIG_MAGIC
            && self.version == CONFIG_VERSION
            && self.battery.full_mv > self.battery.empty_mv
            && self.idle_timeout_s > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = WatchConfig::default();
        assert!(cfg.is_valid());
        assert_eq!(cfg.device_name.as_str(), "Inkwatch");
        assert_eq!(cfg.debounce_ms, 64);
        assert_eq!(cfg.idle_timeout_s, 60);
        assert_eq!(cfg.battery.range_mv(), 800);
    }

    #[test]
    fn test_inverted_calibration_is_invalid() {
        let mut cfg = WatchConfig::default();
        cfg.battery = BatteryCalibration {
            empty_mv: 4200,
            full_mv: 3400,
        };
        assert!(!cfg.is_valid());
        assert_eq!(cfg.battery.range_mv(), 1);
    }

    #[test]
    fn test_pattern_duration() {
        assert_eq!(VibrationPattern::new(75, 6).duration_ms(), 450);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let cfg = WatchConfig::default();
        let mut buf = [0u8; 64];
        let used = postcard::to_slice(&cfg, &mut buf).unwrap();
        let back: WatchConfig = postcard::from_bytes(used).unwrap();
        assert_eq!(back, cfg);
    }
}
