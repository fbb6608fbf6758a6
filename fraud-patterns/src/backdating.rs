//! Date-manipulation detector
//!
//! Flags entries recorded long after their booking date, and bookings
//! clustered on period boundaries beyond the expected share.

use crate::timing::is_month_end;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Days between booking and entry after which an entry counts as delayed
pub const ENTRY_LAG_DAYS: i64 = 30;

/// Expected share of delayed entries
pub const DELAYED_BASELINE: f64 = 0.10;

/// Expected share of bookings on period boundaries
pub const BOUNDARY_BASELINE: f64 = 0.25;

/// Minimum number of entries for a meaningful judgment
pub const MIN_SAMPLE_SIZE: usize = 10;

/// Result of one date-manipulation analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackdatingAnalysis {
    /// Number of entries examined
    pub sample_size: usize,

    /// Entries recorded more than [`ENTRY_LAG_DAYS`] after booking
    pub delayed_count: usize,

    /// delayed_count / entries that track an entry time
    pub delayed_rate: f64,

    /// Share of bookings in the last days of their month
    pub boundary_rate: f64,

    /// True when either rate exceeds its baseline
    pub detected: bool,
}

impl BackdatingAnalysis {
    /// The no-pattern result used when the signal degrades
    pub fn neutral() -> Self {
        Self {
            sample_size: 0,
            delayed_count: 0,
            delayed_rate: 0.0,
            boundary_rate: 0.0,
            detected: false,
        }
    }
}

/// Measure entry lag and period-boundary clustering.
///
/// `entries` holds (booked_at, entered_at) pairs; entries without a recorded
/// entry time only contribute to the boundary measure. Below
/// [`MIN_SAMPLE_SIZE`] entries the result is never a detection.
pub fn analyze(entries: &[(DateTime<Utc>, Option<DateTime<Utc>>)]) -> BackdatingAnalysis {
    if entries.is_empty() {
        return BackdatingAnalysis::neutral();
    }

    let tracked: Vec<(DateTime<Utc>, DateTime<Utc>)> = entries
        .iter()
        .filter_map(|(booked, entered)| entered.map(|e| (*booked, e)))
        .collect();
    let delayed_count = tracked
        .iter()
        .filter(|(booked, entered)| *entered - *booked > Duration::days(ENTRY_LAG_DAYS))
        .count();
    let delayed_rate = if tracked.is_empty() {
        0.0
    } else {
        delayed_count as f64 / tracked.len() as f64
    };

    let boundary_count = entries
        .iter()
        .filter(|(booked, _)| is_month_end(booked.date_naive()))
        .count();
    let boundary_rate = boundary_count as f64 / entries.len() as f64;

    let detected = entries.len() >= MIN_SAMPLE_SIZE
        && (delayed_rate > DELAYED_BASELINE || boundary_rate > BOUNDARY_BASELINE);

    BackdatingAnalysis {
        sample_size: entries.len(),
        delayed_count,
        delayed_rate,
        boundary_rate,
        detected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_prompt_entries_are_clean() {
        let entries: Vec<_> = (1..=12)
            .map(|d| (ts(3, d), Some(ts(3, d) + Duration::days(1))))
            .collect();
        assert!(!analyze(&entries).detected);
    }

    #[test]
    fn test_late_entries_are_detected() {
        let mut entries: Vec<_> = (1..=8)
            .map(|d| (ts(3, d), Some(ts(3, d) + Duration::days(1))))
            .collect();
        entries.push((ts(3, 9), Some(ts(3, 9) + Duration::days(45))));
        entries.push((ts(3, 10), Some(ts(3, 10) + Duration::days(50))));
        let analysis = analyze(&entries);
        assert_eq!(analysis.delayed_count, 2);
        assert!(analysis.detected);
    }

    #[test]
    fn test_month_end_clustering_is_detected() {
        // 6 of 12 bookings on the last days of March
        let mut entries: Vec<_> = (1..=6).map(|d| (ts(3, d), None)).collect();
        entries.extend((29..=31).flat_map(|d| (0..2).map(move |_| (ts(3, d), None))));
        let analysis = analyze(&entries);
        assert!(analysis.boundary_rate > BOUNDARY_BASELINE);
        assert!(analysis.detected);
    }

    #[test]
    fn test_small_sample_is_never_detected() {
        let entries = vec![(ts(3, 1), Some(ts(3, 1) + Duration::days(60)))];
        assert!(!analyze(&entries).detected);
    }
}
