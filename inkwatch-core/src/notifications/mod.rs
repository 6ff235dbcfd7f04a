//! Notification storage and filtering

pub mod filter;
pub mod ring;

pub use filter::{classify, Verdict};
pub use ring::{NotificationRing, RingCursor, NOTIFICATION_ARENA_SIZE};
