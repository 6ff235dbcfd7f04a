//! RP2040-specific HAL for the watch firmware
//!
//! Implements the shared `inkwatch-hal` traits on RP2040 peripherals:
//!
//! - Flash key/value storage (sequential-storage)
//! - Battery voltage ADC channel
//! - On-chip RTC wall clock

#![no_std]

pub mod adc;
pub mod flash;
pub mod rtc;

// Re-export shared traits from inkwatch-hal for convenience
pub use inkwatch_hal::{FlashStorage as FlashStorageTrait, StorageKey};
