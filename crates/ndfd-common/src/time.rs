//! Forecast cycle and valid time handling.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Minutes past the hour before the upstream service is assumed to have
/// published the current hour's files.
pub const CACHE_SERVER_BUFFER_MIN: u32 = 20;

/// Number of forecast hours (from 00Z of the cycle date) considered when
/// enumerating valid times.
pub const MAX_FORECAST_HOURS: u32 = 250;

/// The hour-truncated UTC timestamp identifying the forecast run that
/// cached data belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ForecastCycle(DateTime<Utc>);

impl ForecastCycle {
    /// Cycle active at the given wall-clock time.
    ///
    /// Within the first [`CACHE_SERVER_BUFFER_MIN`] minutes of an hour the
    /// previous hour's cycle is still considered current.
    pub fn at(now: DateTime<Utc>) -> Self {
        let t = if now.minute() <= CACHE_SERVER_BUFFER_MIN {
            now - Duration::hours(1)
        } else {
            now
        };
        Self(truncate_to_hour(t))
    }

    /// Cycle active right now.
    pub fn current() -> Self {
        Self::at(Utc::now())
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.0
    }

    /// Directory name used for this cycle inside the cache root.
    pub fn dir_name(&self) -> String {
        self.0.format("%Y-%m-%d-%H").to_string()
    }

    /// Whether a cache directory name looks like a cycle directory.
    pub fn is_cycle_dir_name(name: &str) -> bool {
        chrono::NaiveDateTime::parse_from_str(&format!("{}:00", name), "%Y-%m-%d-%H:%M").is_ok()
    }

    /// 00Z of the cycle's date.
    pub fn day_start(&self) -> DateTime<Utc> {
        self.0 - Duration::hours(self.0.hour() as i64)
    }

    /// Enumerate candidate valid times for this cycle.
    ///
    /// Starts at 00Z of the cycle date and steps `time_step_hours` through
    /// [`MAX_FORECAST_HOURS`]. Times before `min_time` are skipped; the first
    /// time after `max_time` ends the enumeration.
    pub fn valid_times(
        &self,
        time_step_hours: u32,
        min_time: Option<DateTime<Utc>>,
        max_time: Option<DateTime<Utc>>,
    ) -> ValidTimes {
        let start = self.day_start();
        let step = time_step_hours.max(1) as usize;
        let mut times = BTreeSet::new();

        for hour in (0..MAX_FORECAST_HOURS).step_by(step) {
            let t = start + Duration::hours(hour as i64);
            if min_time.is_some_and(|min| t < min) {
                continue;
            }
            if max_time.is_some_and(|max| t > max) {
                break;
            }
            times.insert(t);
        }

        ValidTimes { times }
    }
}

impl fmt::Display for ForecastCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl From<ForecastCycle> for DateTime<Utc> {
    fn from(cycle: ForecastCycle) -> Self {
        cycle.0
    }
}

/// Set of valid times a query accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidTimes {
    times: BTreeSet<DateTime<Utc>>,
}

impl ValidTimes {
    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        self.times.contains(t)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.times.iter()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Drop minutes, seconds and sub-seconds.
pub fn truncate_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    let naive = t.date_naive().and_time(NaiveTime::MIN) + Duration::hours(t.hour() as i64);
    Utc.from_utc_datetime(&naive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_cycle_rolls_back_within_buffer() {
        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 1));
        assert_eq!(cycle.time(), utc(2024, 3, 5, 13, 0));

        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 20));
        assert_eq!(cycle.time(), utc(2024, 3, 5, 13, 0));
    }

    #[test]
    fn test_cycle_keeps_hour_after_buffer() {
        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 30));
        assert_eq!(cycle.time(), utc(2024, 3, 5, 14, 0));

        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 21));
        assert_eq!(cycle.time(), utc(2024, 3, 5, 14, 0));
    }

    #[test]
    fn test_cycle_rolls_back_across_midnight() {
        let cycle = ForecastCycle::at(utc(2024, 3, 1, 0, 5));
        assert_eq!(cycle.time(), utc(2024, 2, 29, 23, 0));
        assert_eq!(cycle.dir_name(), "2024-02-29-23");
    }

    #[test]
    fn test_cycle_dir_name_detection() {
        assert!(ForecastCycle::is_cycle_dir_name("2024-03-05-14"));
        assert!(!ForecastCycle::is_cycle_dir_name("static"));
        assert!(!ForecastCycle::is_cycle_dir_name("2024-03-05"));
    }

    #[test]
    fn test_valid_times_full_range() {
        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 30));
        let times = cycle.valid_times(1, None, None);
        assert_eq!(times.len(), 250);
        assert_eq!(times.iter().next(), Some(&utc(2024, 3, 5, 0, 0)));

        let times = cycle.valid_times(3, None, None);
        assert_eq!(times.len(), 84);
        assert!(times.contains(&utc(2024, 3, 5, 3, 0)));
        assert!(!times.contains(&utc(2024, 3, 5, 4, 0)));
    }

    #[test]
    fn test_valid_times_window() {
        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 30));
        let times = cycle.valid_times(
            1,
            Some(utc(2024, 3, 5, 18, 0)),
            Some(utc(2024, 3, 6, 0, 0)),
        );
        assert_eq!(times.len(), 7);
        assert!(times.contains(&utc(2024, 3, 5, 18, 0)));
        assert!(times.contains(&utc(2024, 3, 6, 0, 0)));
        assert!(!times.contains(&utc(2024, 3, 6, 1, 0)));
    }

    #[test]
    fn test_valid_times_empty_window() {
        let cycle = ForecastCycle::at(utc(2024, 3, 5, 14, 30));
        let times = cycle.valid_times(1, None, Some(utc(2024, 3, 4, 0, 0)));
        assert!(times.is_empty());
    }
}
