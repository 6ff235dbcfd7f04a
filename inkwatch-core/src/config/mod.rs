//! Configuration types
//!
//! Board-agnostic configuration stored in flash as postcard binary data,
//! with a TOML text fallback compiled into the firmware image.

pub mod toml;
pub mod types;

pub use types::*;
