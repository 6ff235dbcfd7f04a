//! Calendar normalization for time-sync fields
//!
//! The companion app sends broken-down wall-clock fields which may be out of
//! range (minute 60, day 0, month 13). They are folded into a valid
//! date-time the same way C `mktime` does: overflow carries into the next
//! larger unit, underflow borrows from it.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Raw wall-clock fields, month 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarFields {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarFields {
    /// Fold the fields into a valid date-time
    ///
    /// Returns `None` if the result is outside chrono's representable range.
    pub fn normalize(&self) -> Option<NaiveDateTime> {
        let month0 = i32::from(self.month) - 1;
        let year = i32::from(self.year) + month0.div_euclid(12);
        let month = (month0.rem_euclid(12) + 1) as u32;

        let base = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;

        let seconds = (i64::from(self.day) - 1) * 86_400
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second);

        base.checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn fields(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> CalendarFields {
        CalendarFields {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn test_in_range_fields_are_unchanged() {
        let t = fields(2024, 3, 15, 13, 45, 30).normalize().unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 15));
        assert_eq!((t.hour(), t.minute(), t.second()), (13, 45, 30));
    }

    #[test]
    fn test_minute_overflow_carries_into_hour() {
        let t = fields(2024, 3, 15, 13, 60, 0).normalize().unwrap();
        assert_eq!((t.hour(), t.minute()), (14, 0));
    }

    #[test]
    fn test_day_zero_is_last_day_of_previous_month() {
        let t = fields(2024, 3, 0, 8, 0, 0).normalize().unwrap();
        assert_eq!((t.month(), t.day()), (2, 29));

        let t = fields(2023, 1, 0, 8, 0, 0).normalize().unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2022, 12, 31));
    }

    #[test]
    fn test_month_overflow_and_underflow() {
        let t = fields(2024, 13, 1, 0, 0, 0).normalize().unwrap();
        assert_eq!((t.year(), t.month()), (2025, 1));

        let t = fields(2024, 0, 1, 0, 0, 0).normalize().unwrap();
        assert_eq!((t.year(), t.month()), (2023, 12));
    }

    #[test]
    fn test_hour_overflow_crosses_midnight() {
        let t = fields(2024, 12, 31, 24, 0, 0).normalize().unwrap();
        assert_eq!((t.year(), t.month(), t.day(), t.hour()), (2025, 1, 1, 0));
    }
}
