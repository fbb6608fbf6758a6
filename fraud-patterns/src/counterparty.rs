//! Counterparty analyzer
//!
//! Classifies a counterparty against the company's own transaction history
//! with that counterparty: first appearance, reactivation after dormancy, or
//! an amount abnormal relative to the counterparty's historical distribution.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Days without activity after which a counterparty counts as dormant
pub const DORMANCY_DAYS: i64 = 180;

/// Absolute z-score above which an amount is abnormal
pub const ABNORMAL_Z_SCORE: f64 = 3.0;

/// Minimum historical amounts before z-scores are trusted
pub const MIN_HISTORY_FOR_Z_SCORE: usize = 5;

/// How a counterparty relates to the company's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyStatus {
    /// First appearance in the history
    New,
    /// Active again after more than [`DORMANCY_DAYS`] days of silence
    Reactivated,
    /// Amount far outside the counterparty's own distribution
    AbnormalAmount,
    /// Nothing remarkable
    Established,
}

/// Result of one counterparty classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterpartyAnalysis {
    /// Assigned status
    pub status: CounterpartyStatus,

    /// Number of historical transactions considered
    pub history_size: usize,

    /// z-score of the amount against the history, when computable
    pub z_score: Option<f64>,
}

impl CounterpartyAnalysis {
    /// The unremarkable result used when the signal degrades
    pub fn neutral() -> Self {
        Self {
            status: CounterpartyStatus::Established,
            history_size: 0,
            z_score: None,
        }
    }

    /// Whether the status is New
    pub fn is_new(&self) -> bool {
        self.status == CounterpartyStatus::New
    }

    /// Whether the status marks the counterparty as unusual
    pub fn is_unusual(&self) -> bool {
        matches!(
            self.status,
            CounterpartyStatus::Reactivated | CounterpartyStatus::AbnormalAmount
        )
    }
}

/// Classify one transaction against the counterparty's prior history.
///
/// `history` holds (booked_at, amount) pairs for the same counterparty; only
/// entries strictly before `at` are considered.
pub fn classify(
    history: &[(DateTime<Utc>, Decimal)],
    amount: Decimal,
    at: DateTime<Utc>,
) -> CounterpartyAnalysis {
    let mut prior: Vec<&(DateTime<Utc>, Decimal)> =
        history.iter().filter(|(booked, _)| *booked < at).collect();
    prior.sort_by_key(|(booked, _)| *booked);

    if prior.is_empty() {
        return CounterpartyAnalysis {
            status: CounterpartyStatus::New,
            history_size: 0,
            z_score: None,
        };
    }

    let last_seen = prior.last().map(|(booked, _)| *booked).unwrap_or(at);
    if at - last_seen > Duration::days(DORMANCY_DAYS) {
        return CounterpartyAnalysis {
            status: CounterpartyStatus::Reactivated,
            history_size: prior.len(),
            z_score: None,
        };
    }

    let z_score = amount_z_score(&prior, amount);
    let status = match z_score {
        Some(z) if z.abs() > ABNORMAL_Z_SCORE => CounterpartyStatus::AbnormalAmount,
        _ => CounterpartyStatus::Established,
    };

    CounterpartyAnalysis {
        status,
        history_size: prior.len(),
        z_score,
    }
}

fn amount_z_score(prior: &[&(DateTime<Utc>, Decimal)], amount: Decimal) -> Option<f64> {
    if prior.len() < MIN_HISTORY_FOR_Z_SCORE {
        return None;
    }

    let amounts: Vec<f64> = prior
        .iter()
        .filter_map(|(_, a)| a.abs().to_f64())
        .collect();
    if amounts.len() < MIN_HISTORY_FOR_Z_SCORE {
        return None;
    }

    let n = amounts.len() as f64;
    let mean = amounts.iter().sum::<f64>() / n;
    let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return None;
    }

    amount.abs().to_f64().map(|a| (a - mean) / std_dev)
}
