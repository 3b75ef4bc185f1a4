// libs/shared/models/src/time.rs
//
// Wall-clock and absolute time are kept apart: rules, overrides and slots use
// `LocalTimeOfDay`, bookings and blocks use `DateTime<Utc>`. `ClinicTimezone::localize`
// is the only bridge between the two.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchedulingError;

pub const MINUTES_PER_HOUR: u16 = 60;
pub const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

/// Minute offset meaning "midnight of the following day". A rule whose end reads
/// `00:00` ends here, never at minute 0.
pub const END_OF_DAY_MINUTES: u16 = MINUTES_PER_DAY;

/// A wall-clock time in the clinic timezone, stored as minutes since local midnight.
///
/// Values range over `0..=1440`; 1440 only appears as the end of a slot that runs up to
/// midnight and renders as `00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalTimeOfDay(u16);

impl LocalTimeOfDay {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(END_OF_DAY_MINUTES);

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= END_OF_DAY_MINUTES).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        (self.0 % MINUTES_PER_DAY) / MINUTES_PER_HOUR
    }

    pub fn minute(self) -> u16 {
        self.0 % MINUTES_PER_HOUR
    }

    pub fn is_hour_aligned(self) -> bool {
        self.0 % MINUTES_PER_HOUR == 0
    }

    /// Parse `HH:MM` or `HH:MM:SS` (seconds must be zero).
    pub fn parse(raw: &str) -> Result<Self, SchedulingError> {
        let raw = raw.trim();
        let time = NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| SchedulingError::invalid(format!("'{}' is not a valid time of day", raw)))?;

        use chrono::Timelike;
        if time.second() != 0 || time.nanosecond() != 0 {
            return Err(SchedulingError::invalid(format!(
                "'{}' must be expressed in whole minutes",
                raw
            )));
        }

        Ok(Self((time.hour() * 60 + time.minute()) as u16))
    }
}

/// Resolve an end time to its minute offset, reading `00:00` as the end of the day.
pub fn effective_end_minutes(end: LocalTimeOfDay) -> u16 {
    if end.0 == 0 {
        END_OF_DAY_MINUTES
    } else {
        end.0
    }
}

impl fmt::Display for LocalTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for LocalTimeOfDay {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LocalTimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalTimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, SchedulingError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| SchedulingError::invalid(format!("'{}' is not a valid date (expected YYYY-MM-DD)", raw)))
}

/// Weekday index with 0 = Sunday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The clinic's single, fixed timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClinicTimezone(Tz);

impl ClinicTimezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    /// Local calendar date of an instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Convert a wall-clock time on `date` into an absolute instant.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant; times inside
    /// a DST gap are shifted forward past the gap.
    pub fn localize(&self, date: NaiveDate, time: LocalTimeOfDay) -> Result<DateTime<Utc>, SchedulingError> {
        let naive = wall_clock(date, time)
            .ok_or_else(|| SchedulingError::invalid(format!("{} {} is out of range", date, time)))?;

        self.resolve_local(naive)
            .or_else(|| {
                naive
                    .checked_add_signed(Duration::hours(1))
                    .and_then(|shifted| self.resolve_local(shifted))
            })
            .ok_or_else(|| SchedulingError::invalid(format!("{} {} does not exist in {}", date, time, self.0)))
    }

    /// False when the wall clock skips `time` on `date` (DST gap).
    pub fn exists(&self, date: NaiveDate, time: LocalTimeOfDay) -> bool {
        wall_clock(date, time)
            .and_then(|naive| self.resolve_local(naive))
            .is_some()
    }

    /// `[start, end)` instants covering the local calendar day.
    pub fn day_bounds(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), SchedulingError> {
        Ok((
            self.localize(date, LocalTimeOfDay::MIDNIGHT)?,
            self.localize(date, LocalTimeOfDay::END_OF_DAY)?,
        ))
    }

    fn resolve_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.0.from_local_datetime(&naive) {
            LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }
}

/// `END_OF_DAY` lands on midnight of the following date.
fn wall_clock(date: NaiveDate, time: LocalTimeOfDay) -> Option<NaiveDateTime> {
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::minutes(time.minutes() as i64))
}
