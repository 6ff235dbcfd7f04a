//! Peripheral drivers
//!
//! Concrete drivers built on `embedded-hal` traits and the traits in
//! `inkwatch-hal`:
//!
//! - Vibration motor (pattern playback on a GPIO pin)
//! - Battery monitor (ADC reading through the VSYS divider)
//! - SSD1681 e-paper controller

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod ssd1681;
pub mod vibration;

pub use battery::{BatteryMonitor, VoltageDivider};
pub use ssd1681::Ssd1681;
pub use vibration::VibrationMotor;
