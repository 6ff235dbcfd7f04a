//! On-chip RTC
//!
//! The RP2040 RTC keeps running through dormant sleep as long as the
//! board stays powered. It stores broken-down fields, so conversion to and
//! from chrono happens here.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc};
use embassy_rp::Peri;

use inkwatch_hal::rtc::{RtcError, WallClock};

/// RP2040 RTC wall clock
pub struct Rp2040Clock<'d> {
    rtc: Rtc<'d, RTC>,
}

impl<'d> Rp2040Clock<'d> {
    pub fn new(rtc: Peri<'d, RTC>) -> Self {
        Self { rtc: Rtc::new(rtc) }
    }
}

fn day_of_week(day: Weekday) -> DayOfWeek {
    match day {
        Weekday::Sun => DayOfWeek::Sunday,
        Weekday::Mon => DayOfWeek::Monday,
        Weekday::Tue => DayOfWeek::Tuesday,
        Weekday::Wed => DayOfWeek::Wednesday,
        Weekday::Thu => DayOfWeek::Thursday,
        Weekday::Fri => DayOfWeek::Friday,
        Weekday::Sat => DayOfWeek::Saturday,
    }
}

fn to_rtc(time: NaiveDateTime) -> Result<DateTime, RtcError> {
    let year = u16::try_from(time.year()).map_err(|_| RtcError::InvalidTime)?;
    Ok(DateTime {
        year,
        month: time.month() as u8,
        day: time.day() as u8,
        day_of_week: day_of_week(time.weekday()),
        hour: time.hour() as u8,
        minute: time.minute() as u8,
        second: time.second() as u8,
    })
}

fn from_rtc(dt: &DateTime) -> Result<NaiveDateTime, RtcError> {
    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(dt.hour),
                u32::from(dt.minute),
                u32::from(dt.second),
            )
        })
        .ok_or(RtcError::InvalidTime)
}

impl<'d> WallClock for Rp2040Clock<'d> {
    fn now(&mut self) -> Result<NaiveDateTime, RtcError> {
        let dt = self.rtc.now().map_err(|e| match e {
            embassy_rp::rtc::RtcError::NotRunning => RtcError::NotRunning,
            _ => RtcError::InvalidTime,
        })?;
        from_rtc(&dt)
    }

    fn set(&mut self, time: NaiveDateTime) -> Result<(), RtcError> {
        self.rtc
            .set_datetime(to_rtc(time)?)
            .map_err(|_| RtcError::InvalidTime)
    }
}
