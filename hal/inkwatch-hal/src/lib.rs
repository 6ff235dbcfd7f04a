//! Inkwatch Hardware Abstraction Layer
//!
//! This crate defines the hardware-facing traits the watch logic is written
//! against. Chip-specific HALs implement them; the firmware wires the
//! implementations into its tasks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (inkwatch-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  inkwatch-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ inkwatch-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key/value blocks
//! - [`adc::BatteryAdc`] - Raw battery voltage samples
//! - [`rtc::WallClock`] - Read and set the real-time clock

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod flash;
pub mod rtc;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, BatteryAdc};
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use rtc::{RtcError, WallClock};
