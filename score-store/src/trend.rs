//! Derived trend view
//!
//! Compares the current-period average score against the prior period of
//! equal length. A read-only derivation over the history; nothing here is
//! ever written back.

use chrono::{DateTime, Duration, Utc};
use risk_core::RiskScoreHistoryEntry;
use serde::Serialize;

/// Score-point band inside which two period averages count as equal
pub const STABLE_BAND: f64 = 2.0;

/// Direction of an entity's score over two adjacent periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Current period averages higher than the prior period
    Increasing,
    /// Current period averages lower than the prior period
    Decreasing,
    /// Averages within [`STABLE_BAND`] points of each other
    Stable,
}

/// Derive the trend over `[now - period, now]` against the period before it.
///
/// Returns `None` when either period holds no entries; a trend needs
/// something on both sides of the boundary.
pub fn direction(
    history: &[RiskScoreHistoryEntry],
    now: DateTime<Utc>,
    period: Duration,
) -> Option<TrendDirection> {
    let boundary = now - period;
    let prior_start = boundary - period;

    let current = period_average(history, boundary, now)?;
    let prior = period_average(history, prior_start, boundary)?;

    let delta = current - prior;
    if delta.abs() <= STABLE_BAND {
        Some(TrendDirection::Stable)
    } else if delta > 0.0 {
        Some(TrendDirection::Increasing)
    } else {
        Some(TrendDirection::Decreasing)
    }
}

fn period_average(
    history: &[RiskScoreHistoryEntry],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Option<f64> {
    let scores: Vec<f64> = history
        .iter()
        .filter(|entry| entry.created_at > from && entry.created_at <= to)
        .map(|entry| entry.score.value() as f64)
        .collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::{EntityType, RiskScore, Severity, TenantId};
    use uuid::Uuid;

    fn entries(scores_by_days_ago: &[(i64, u8)], now: DateTime<Utc>) -> Vec<RiskScoreHistoryEntry> {
        let tenant = TenantId::generate();
        let entity = Uuid::new_v4();
        scores_by_days_ago
            .iter()
            .map(|&(days_ago, score)| {
                let score = RiskScore::new(score);
                RiskScoreHistoryEntry {
                    tenant_id: tenant,
                    entity_type: EntityType::Document,
                    entity_id: entity,
                    score,
                    severity: Severity::of(score),
                    created_at: now - Duration::days(days_ago),
                }
            })
            .collect()
    }

    #[test]
    fn test_increasing() {
        let now = Utc::now();
        let history = entries(&[(40, 20), (35, 25), (10, 60), (5, 70)], now);
        assert_eq!(
            direction(&history, now, Duration::days(30)),
            Some(TrendDirection::Increasing)
        );
    }

    #[test]
    fn test_decreasing() {
        let now = Utc::now();
        let history = entries(&[(40, 80), (35, 70), (10, 30), (5, 20)], now);
        assert_eq!(
            direction(&history, now, Duration::days(30)),
            Some(TrendDirection::Decreasing)
        );
    }

    #[test]
    fn test_stable_within_band() {
        let now = Utc::now();
        let history = entries(&[(40, 50), (10, 51)], now);
        assert_eq!(
            direction(&history, now, Duration::days(30)),
            Some(TrendDirection::Stable)
        );
    }

    #[test]
    fn test_missing_period_gives_no_trend() {
        let now = Utc::now();
        let history = entries(&[(10, 60), (5, 70)], now);
        assert_eq!(direction(&history, now, Duration::days(30)), None);
    }
}
