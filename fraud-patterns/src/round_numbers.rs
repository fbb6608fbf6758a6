//! Round-number detector
//!
//! Fabricated figures skew toward exact multiples of round bases. The set is
//! suspicious when the share of round amounts reaches 30%.

use rust_decimal::Decimal;
use serde::Serialize;

/// Round bases an amount is checked against
pub const ROUND_BASES: [i64; 2] = [100, 1_000];

/// Share of round amounts at which the set becomes suspicious
pub const SUSPICIOUS_RATIO: f64 = 0.30;

/// Result of one round-number analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundNumberAnalysis {
    /// Number of non-zero amounts examined
    pub sample_size: usize,

    /// Amounts that are an exact multiple of a round base
    pub round_count: usize,

    /// round_count / sample_size
    pub ratio: f64,

    /// True when the ratio reaches [`SUSPICIOUS_RATIO`]
    pub suspicious: bool,
}

impl RoundNumberAnalysis {
    /// The non-suspicious result used when the signal degrades
    pub fn neutral() -> Self {
        Self {
            sample_size: 0,
            round_count: 0,
            ratio: 0.0,
            suspicious: false,
        }
    }
}

/// Count amounts that are exact multiples of a round base.
pub fn analyze(amounts: &[Decimal]) -> RoundNumberAnalysis {
    let usable: Vec<&Decimal> = amounts.iter().filter(|a| !a.is_zero()).collect();
    if usable.is_empty() {
        return RoundNumberAnalysis::neutral();
    }

    let round_count = usable.iter().filter(|a| is_round(a)).count();
    let ratio = round_count as f64 / usable.len() as f64;

    RoundNumberAnalysis {
        sample_size: usable.len(),
        round_count,
        ratio,
        suspicious: ratio >= SUSPICIOUS_RATIO,
    }
}

fn is_round(amount: &Decimal) -> bool {
    ROUND_BASES
        .iter()
        .any(|&base| (amount.abs() % Decimal::from(base)).is_zero())
}
