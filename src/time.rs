//! Wall-clock timestamps.
//!
//! [`WallTime`] is Unix seconds (UTC). The RTC stores calendar fields and
//! the wire payload carries `YYYY-MM-DDThh:mm:ss`; both conversions go
//! through chrono.

use core::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// Rendered timestamp, always 19 bytes for years 0000–9999.
pub type IsoString = heapless::String<24>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct WallTime(pub i64);

/// Broken-down UTC calendar time, as held by the RTC registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallTime {
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn unix_secs(self) -> i64 {
        self.0
    }

    fn to_datetime(self) -> DateTime<Utc> {
        // Out-of-range seconds clamp to the epoch rather than panic.
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// `YYYY-MM-DDThh:mm:ss` in UTC.
    pub fn to_iso8601(self) -> IsoString {
        let mut out = IsoString::new();
        let _ = write!(out, "{}", self.to_datetime().format("%Y-%m-%dT%H:%M:%S"));
        out
    }

    pub fn to_calendar(self) -> CalendarTime {
        let dt = self.to_datetime();
        CalendarTime {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        }
    }

    /// `None` if the fields do not form a valid date/time.
    pub fn from_calendar(c: CalendarTime) -> Option<Self> {
        let dt = NaiveDate::from_ymd_opt(c.year.into(), c.month.into(), c.day.into())?
            .and_hms_opt(c.hour.into(), c.minute.into(), c.second.into())?;
        Some(Self(dt.and_utc().timestamp()))
    }
}
