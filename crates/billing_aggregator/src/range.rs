//! Symbolic reporting ranges

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use core_kernel::TimeWindow;

/// The reporting ranges callers can request
///
/// Unrecognized input resolves to the 30-day default by explicit policy
/// (logged, never a silent failure): a dashboard asking for a window it
/// misspelled still gets a coherent summary, clearly attributed to 30d.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    Last7Days,
    Last30Days,
    Last90Days,
}

impl TimeRange {
    /// Parses a symbolic range, defaulting to 30 days
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "7d" => TimeRange::Last7Days,
            "30d" => TimeRange::Last30Days,
            "90d" => TimeRange::Last90Days,
            other => {
                warn!(input = %other, "unrecognized time range, defaulting to 30d");
                TimeRange::Last30Days
            }
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Last7Days => 7,
            TimeRange::Last30Days => 30,
            TimeRange::Last90Days => 90,
        }
    }

    /// Resolves the symbolic range against a reference instant
    pub fn resolve(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            from: now - Duration::days(self.days()),
            to: now,
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Last30Days
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_known_ranges() {
        assert_eq!(TimeRange::parse("7d"), TimeRange::Last7Days);
        assert_eq!(TimeRange::parse("30d"), TimeRange::Last30Days);
        assert_eq!(TimeRange::parse("90d"), TimeRange::Last90Days);
    }

    #[test]
    fn test_unrecognized_defaults_to_30d() {
        assert_eq!(TimeRange::parse("quarter"), TimeRange::Last30Days);
        assert_eq!(TimeRange::parse(""), TimeRange::Last30Days);
    }

    #[test]
    fn test_resolve() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = TimeRange::Last7Days.resolve(now);
        assert_eq!(window.to, now);
        assert_eq!(window.from, Utc.with_ymd_and_hms(2024, 3, 24, 12, 0, 0).unwrap());
    }
}
