//! Battery estimator
//!
//! Turns raw voltage samples into a charge percentage and a discharge
//! rate. The rate is a linear estimate over the current discharge run:
//!
//! ```text
//! rate (%/day) = (V_start - V_now) * 100 * 86400 / (elapsed_s * (V_full - V_empty))
//! ```
//!
//! A run restarts when there is no baseline yet or the voltage rose for
//! more than five measurements in a row (the watch is on the charger).

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::BatteryCalibration;

/// Samples per persisted log block
pub const LOG_BLOCK_SAMPLES: usize = 24;

/// Consecutive rises tolerated before the baseline is reset
pub const MAX_UP_COUNT: u8 = 5;

/// Minutes between log samples
pub const LOG_INTERVAL_MIN: u16 = 10;

const SECONDS_PER_DAY: i64 = 86_400;

/// A full block of logged samples, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogBlock {
    /// Timestamp of the first sample (seconds)
    pub start_time_s: u32,
    /// Voltages in mV, one every [`LOG_INTERVAL_MIN`] minutes
    pub samples: Vec<u16, LOG_BLOCK_SAMPLES>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sample {
    voltage_mv: u16,
    time_s: u32,
}

/// Battery state across measurements
#[derive(Debug, Clone)]
pub struct BatteryEstimator {
    calibration: BatteryCalibration,
    /// Start of the current discharge run
    start: Option<Sample>,
    /// Previous measurement
    prev: Option<Sample>,
    /// Consecutive voltage rises
    up_count: u8,
    /// Percent per day
    discharge_rate: u16,
    log: Vec<u16, LOG_BLOCK_SAMPLES>,
    log_start_s: u32,
    /// Minute of day of the last logged sample
    last_logged_minute: Option<u16>,
}

impl BatteryEstimator {
    /// Create an estimator with no history
    pub fn new(calibration: BatteryCalibration) -> Self {
        Self {
            calibration,
            start: None,
            prev: None,
            up_count: 0,
            discharge_rate: 0,
            log: Vec::new(),
            log_start_s: 0,
            last_logged_minute: None,
        }
    }

    /// Record one voltage measurement
    ///
    /// # Arguments
    /// - `now_s`: wall-clock seconds
    /// - `minute_of_day`: 0..1440, drives the 10-minute log cadence
    /// - `voltage_mv`: battery voltage
    ///
    /// Returns a block to persist when the sample log fills up.
    pub fn measure(&mut self, now_s: u32, minute_of_day: u16, voltage_mv: u16) -> Option<LogBlock> {
        let sample = Sample {
            voltage_mv,
            time_s: now_s,
        };

        if let Some(prev) = self.prev {
            if voltage_mv > prev.voltage_mv {
                self.up_count = self.up_count.saturating_add(1);
            } else {
                self.up_count = 0;
            }
        }
        self.prev = Some(sample);

        match self.start {
            Some(start) if self.up_count <= MAX_UP_COUNT => self.update_rate(start, sample),
            _ => {
                self.start = Some(sample);
                self.discharge_rate = 0;
            }
        }

        self.log_sample(now_s, minute_of_day, voltage_mv)
    }

    fn update_rate(&mut self, start: Sample, now: Sample) {
        let elapsed = i64::from(now.time_s) - i64::from(start.time_s);
        if elapsed <= 0 {
            return;
        }
        let drop_mv = i64::from(start.voltage_mv) - i64::from(now.voltage_mv);
        let rate = drop_mv * 100 * SECONDS_PER_DAY
            / (elapsed * i64::from(self.calibration.range_mv()));
        self.discharge_rate = rate.clamp(0, i64::from(u16::MAX)) as u16;
    }

    fn log_sample(&mut self, now_s: u32, minute_of_day: u16, voltage_mv: u16) -> Option<LogBlock> {
        if minute_of_day % LOG_INTERVAL_MIN != 0 || self.last_logged_minute == Some(minute_of_day) {
            return None;
        }
        self.last_logged_minute = Some(minute_of_day);

        if self.log.is_empty() {
            self.log_start_s = now_s;
        }
        // Never full here: a full log is flushed right after the push
        let _ = self.log.push(voltage_mv);

        if self.log.is_full() {
            return Some(LogBlock {
                start_time_s: self.log_start_s,
                samples: core::mem::take(&mut self.log),
            });
        }
        None
    }

    /// Charge level in percent for a voltage
    pub fn level(&self, voltage_mv: u16) -> u8 {
        let above_empty = i32::from(voltage_mv) - i32::from(self.calibration.empty_mv);
        let level = above_empty * 100 / i32::from(self.calibration.range_mv());
        level.clamp(0, 100) as u8
    }

    /// Level of the last measurement
    pub fn last_level(&self) -> Option<u8> {
        self.prev.map(|s| self.level(s.voltage_mv))
    }

    /// Estimated discharge in percent per day
    pub fn discharge_rate(&self) -> u16 {
        self.discharge_rate
    }

    /// Voltage has been rising long enough to assume a charger
    pub fn is_charging(&self) -> bool {
        self.up_count > MAX_UP_COUNT
    }

    /// Samples logged but not yet persisted
    pub fn pending_samples(&self) -> usize {
        self.log.len()
    }
}
