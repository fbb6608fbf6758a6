//! Circular-transaction detector
//!
//! An outgoing amount to a counterparty answered by a near-equal incoming
//! amount from the same counterparty within a short window suggests funds
//! moving in a circle.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Days within which the returning leg must arrive
pub const MATCH_WINDOW_DAYS: i64 = 14;

/// Relative amount tolerance for the returning leg, in basis points
pub const AMOUNT_TOLERANCE_BPS: i64 = 100;

/// One signed transfer; negative amounts are outgoing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferSample {
    /// Counterparty name, if known
    pub counterparty: Option<String>,

    /// Signed amount
    pub amount: Decimal,

    /// Booking date
    pub booked_at: DateTime<Utc>,
}

/// Result of one circular-flow analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircularAnalysis {
    /// Outgoing transfers with a matching return leg
    pub pair_count: usize,

    /// True when at least one pair was found
    pub detected: bool,
}

impl CircularAnalysis {
    /// The no-pattern result used when the signal degrades
    pub fn neutral() -> Self {
        Self {
            pair_count: 0,
            detected: false,
        }
    }
}

/// Find outgoing transfers answered by a near-equal return leg.
pub fn analyze(transfers: &[TransferSample]) -> CircularAnalysis {
    let tolerance = Decimal::new(AMOUNT_TOLERANCE_BPS, 4);

    let pair_count = transfers
        .iter()
        .filter(|out| out.amount.is_sign_negative() && !out.amount.is_zero())
        .filter(|out| {
            let out_abs = out.amount.abs();
            let band = out_abs * tolerance;
            transfers.iter().any(|back| {
                back.amount.is_sign_positive()
                    && !back.amount.is_zero()
                    && back.counterparty.is_some()
                    && back.counterparty == out.counterparty
                    && (back.amount - out_abs).abs() <= band
                    && back.booked_at >= out.booked_at
                    && back.booked_at - out.booked_at <= Duration::days(MATCH_WINDOW_DAYS)
            })
        })
        .count();

    CircularAnalysis {
        pair_count,
        detected: pair_count > 0,
    }
}
