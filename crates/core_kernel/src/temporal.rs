//! Temporal types for the billing engine
//!
//! This module separates two notions the rest of the engine must never
//! confuse:
//! - A wall-clock instant (`DateTime<Utc>`), used for store fetch windows
//!   and FX rate lookups
//! - A calendar day (`NaiveDate`), used for service periods and ratable
//!   recognition day counts
//!
//! The [`Timezone`] wrapper is the only place instants become calendar
//! days, so month-start and day-overlap calculations cannot drift across
//! timezone boundaries.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: String, end: String },
}

/// Timezone wrapper for calendar computations
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn utc() -> Self {
        Self(chrono_tz::UTC)
    }

    /// Returns the calendar date of an instant in this timezone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_local_timezone(self.0)
            .earliest()
            .expect("midnight local time exists for every calendar day")
            .with_timezone(&Utc)
    }

    /// Returns the first instant of the calendar month containing `instant`
    pub fn month_start(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let local_date = self.date_of(instant);
        let first = NaiveDate::from_ymd_opt(local_date.year(), local_date.month(), 1)
            .expect("day 1 exists in every month");
        self.start_of_day(first)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

/// An inclusive range of calendar days
///
/// Service periods and recognition query windows are calendar-day ranges;
/// both endpoints are part of the range, so a single-day period has
/// `start == end` and one day of length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single calendar day
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The calendar month containing the given date
    pub fn month_of(date: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .expect("day 1 exists in every month");
        let end = if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        }
        .expect("day 1 exists in every month")
            - Duration::days(1);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the range, inclusive of both endpoints
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The intersection with another range, if any
    pub fn overlap(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(DateRange { start, end })
        } else {
            None
        }
    }

    /// Number of days shared with another range
    pub fn overlap_days(&self, other: &DateRange) -> i64 {
        self.overlap(other).map_or(0, |r| r.days())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A window of wall-clock instants, used for store fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, TemporalError> {
        if from > to {
            return Err(TemporalError::InvalidPeriod {
                start: from.to_string(),
                end: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant <= self.to
    }

    /// Converts the window to calendar days in the given timezone
    pub fn to_date_range(&self, tz: &Timezone) -> DateRange {
        DateRange {
            start: tz.date_of(self.from),
            end: tz.date_of(self.to),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).is_ok());
        assert!(matches!(
            DateRange::new(d(2024, 2, 1), d(2024, 1, 1)),
            Err(TemporalError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_date_range_inclusive_days() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(range.days(), 31);
        assert_eq!(DateRange::single_day(d(2024, 6, 15)).days(), 1);
    }

    #[test]
    fn test_date_range_overlap() {
        let a = DateRange::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
        let b = DateRange::new(d(2024, 6, 1), d(2024, 12, 31)).unwrap();

        let overlap = a.overlap(&b).unwrap();
        assert_eq!(overlap.start, d(2024, 6, 1));
        assert_eq!(overlap.end, d(2024, 6, 30));
        assert_eq!(a.overlap_days(&b), 30);

        let c = DateRange::new(d(2025, 1, 1), d(2025, 1, 2)).unwrap();
        assert!(a.overlap(&c).is_none());
        assert_eq!(a.overlap_days(&c), 0);
    }

    #[test]
    fn test_month_of() {
        let feb = DateRange::month_of(d(2024, 2, 15));
        assert_eq!(feb.start, d(2024, 2, 1));
        assert_eq!(feb.end, d(2024, 2, 29)); // leap year

        let dec = DateRange::month_of(d(2023, 12, 31));
        assert_eq!(dec.start, d(2023, 12, 1));
        assert_eq!(dec.end, d(2023, 12, 31));
    }

    #[test]
    fn test_month_start_utc() {
        let tz = Timezone::utc();
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 0).unwrap();
        let start = tz.month_start(instant);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_start_respects_timezone() {
        // 2024-03-01 03:00 UTC is still February in New York
        let tz = Timezone::new(chrono_tz::America::New_York);
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap();
        assert_eq!(tz.date_of(instant), d(2024, 2, 29));
        let start = tz.month_start(instant);
        assert_eq!(tz.date_of(start), d(2024, 2, 1));
    }

    #[test]
    fn test_time_window() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let window = TimeWindow::new(from, to).unwrap();

        assert!(window.contains(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert!(TimeWindow::new(to, from).is_err());

        let range = window.to_date_range(&Timezone::utc());
        assert_eq!(range.start, d(2024, 1, 1));
        assert_eq!(range.end, d(2024, 1, 31));
    }
}
