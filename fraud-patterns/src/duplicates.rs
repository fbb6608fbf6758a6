//! Duplicate-invoice detector
//!
//! An invoice is a duplicate candidate when another invoice in the same
//! tenant carries the same amount and (when both are named) the same
//! counterparty, with issue dates inside a ±30-day window.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Issue-date window for duplicate matching, in days each direction
pub const DUPLICATE_WINDOW_DAYS: i64 = 30;

/// The invoice fields duplicate matching looks at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSample {
    /// Gross amount
    pub amount: Decimal,

    /// Counterparty name, if known
    pub counterparty: Option<String>,

    /// Issue date
    pub issued_on: NaiveDate,
}

/// Whether `target` has a duplicate among `others`.
///
/// The caller passes `others` without the target invoice itself.
pub fn has_duplicate(target: &InvoiceSample, others: &[InvoiceSample]) -> bool {
    others.iter().any(|other| is_duplicate_pair(target, other))
}

fn is_duplicate_pair(a: &InvoiceSample, b: &InvoiceSample) -> bool {
    if a.amount != b.amount {
        return false;
    }
    if (a.issued_on - b.issued_on).num_days().abs() > DUPLICATE_WINDOW_DAYS {
        return false;
    }
    match (&a.counterparty, &b.counterparty) {
        (Some(left), Some(right)) => left == right,
        _ => true,
    }
}

/// Count external invoice numbers that occur more than once.
pub fn duplicate_external_number_count<'a, I>(numbers: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = std::collections::HashMap::new();
    for number in numbers {
        *counts.entry(number).or_insert(0usize) += 1;
    }
    counts.values().filter(|&&n| n > 1).count()
}
