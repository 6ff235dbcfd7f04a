//! Real-time clock access
//!
//! The RTC keeps wall-clock time across deep sleep. A failed read is not
//! fatal: callers render a placeholder and keep going.

use chrono::NaiveDateTime;

/// RTC failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Clock has not been set since power-up
    NotRunning,
    /// Stored value is not a valid date-time
    InvalidTime,
}

/// Wall clock backed by an RTC peripheral
pub trait WallClock {
    /// Current local time
    fn now(&mut self) -> Result<NaiveDateTime, RtcError>;

    /// Set the clock
    fn set(&mut self, time: NaiveDateTime) -> Result<(), RtcError>;
}
