//! Timing-pattern analyzer
//!
//! Flags bookings clustered outside business hours, on weekends, or at
//! month-end beyond their expected baseline rates.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use serde::Serialize;

/// Expected share of entries outside business hours
pub const AFTER_HOURS_BASELINE: f64 = 0.20;

/// Expected share of entries on weekends
pub const WEEKEND_BASELINE: f64 = 0.15;

/// Expected share of entries in the last three days of a month
pub const MONTH_END_BASELINE: f64 = 0.25;

/// Minimum number of entries for a meaningful judgment
pub const MIN_SAMPLE_SIZE: usize = 10;

/// Business hours span 07:00 to 19:00
const BUSINESS_OPEN_HOUR: u32 = 7;
const BUSINESS_CLOSE_HOUR: u32 = 19;

/// Days counted as month-end
const MONTH_END_DAYS: u32 = 3;

/// Result of one timing analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingAnalysis {
    /// Number of entries examined
    pub sample_size: usize,

    /// Share of entries outside business hours
    pub after_hours_rate: f64,

    /// Share of entries on Saturday or Sunday
    pub weekend_rate: f64,

    /// Share of entries in the last three days of their month
    pub month_end_rate: f64,

    /// True when any observed rate exceeds twice its baseline
    pub unusual: bool,
}

impl TimingAnalysis {
    /// The unremarkable result used when the signal degrades
    pub fn neutral() -> Self {
        Self {
            sample_size: 0,
            after_hours_rate: 0.0,
            weekend_rate: 0.0,
            month_end_rate: 0.0,
            unusual: false,
        }
    }
}

/// Measure after-hours, weekend and month-end clustering.
///
/// Below [`MIN_SAMPLE_SIZE`] entries the result is never unusual.
pub fn analyze(booked_at: &[DateTime<Utc>]) -> TimingAnalysis {
    if booked_at.is_empty() {
        return TimingAnalysis::neutral();
    }

    let total = booked_at.len() as f64;
    let after_hours = booked_at.iter().filter(|ts| is_after_hours(ts)).count() as f64;
    let weekend = booked_at.iter().filter(|ts| is_weekend(ts)).count() as f64;
    let month_end = booked_at
        .iter()
        .filter(|ts| is_month_end(ts.date_naive()))
        .count() as f64;

    let after_hours_rate = after_hours / total;
    let weekend_rate = weekend / total;
    let month_end_rate = month_end / total;

    let unusual = booked_at.len() >= MIN_SAMPLE_SIZE
        && (after_hours_rate > 2.0 * AFTER_HOURS_BASELINE
            || weekend_rate > 2.0 * WEEKEND_BASELINE
            || month_end_rate > 2.0 * MONTH_END_BASELINE);

    TimingAnalysis {
        sample_size: booked_at.len(),
        after_hours_rate,
        weekend_rate,
        month_end_rate,
        unusual,
    }
}

fn is_after_hours(ts: &DateTime<Utc>) -> bool {
    let hour = ts.hour();
    hour < BUSINESS_OPEN_HOUR || hour >= BUSINESS_CLOSE_HOUR
}

fn is_weekend(ts: &DateTime<Utc>) -> bool {
    matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether a date falls in the last [`MONTH_END_DAYS`] days of its month.
pub(crate) fn is_month_end(date: NaiveDate) -> bool {
    date.day() > days_in_month(date.year(), date.month()) - MONTH_END_DAYS
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid first of month");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid first of next month");
    (next - first).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_month_end_window() {
        assert!(is_month_end(NaiveDate::from_ymd_opt(2025, 1, 29).unwrap()));
        assert!(is_month_end(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
        assert!(!is_month_end(NaiveDate::from_ymd_opt(2025, 1, 28).unwrap()));
    }

    #[test]
    fn test_after_hours_cluster_is_unusual() {
        // Mid-month weekdays at 22:00: half the entries after hours
        let mut entries: Vec<DateTime<Utc>> = (0..5).map(|i| at(2025, 3, 10 + i, 22)).collect();
        entries.extend((0..5).map(|i| at(2025, 3, 10 + i, 10)));
        let analysis = analyze(&entries);
        assert!(analysis.after_hours_rate > 2.0 * AFTER_HOURS_BASELINE);
        assert!(analysis.unusual);
    }

    #[test]
    fn test_business_hours_weekdays_are_normal() {
        // 2025-03-10 is a Monday
        let entries: Vec<DateTime<Utc>> = (0..5)
            .flat_map(|i| (0..2).map(move |j| at(2025, 3, 10 + i, 9 + j)))
            .collect();
        let analysis = analyze(&entries);
        assert!(!analysis.unusual);
    }

    #[test]
    fn test_small_sample_is_never_unusual() {
        let entries: Vec<DateTime<Utc>> = (0..5).map(|i| at(2025, 3, 10 + i, 23)).collect();
        let analysis = analyze(&entries);
        assert_eq!(analysis.sample_size, 5);
        assert!(!analysis.unusual);
    }
}
