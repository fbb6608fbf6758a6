//! VAT-rate anomaly detector
//!
//! Flags a company whose share of transactions carrying an off-standard VAT
//! rate exceeds the expected baseline.

use rust_decimal::Decimal;
use serde::Serialize;

/// Expected share of off-standard rates
pub const OFF_STANDARD_BASELINE: f64 = 0.10;

/// Minimum number of rated transactions for a meaningful judgment
pub const MIN_SAMPLE_SIZE: usize = 10;

/// Result of one VAT-rate analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatAnalysis {
    /// Number of rated transactions examined
    pub sample_size: usize,

    /// Transactions carrying a rate outside the standard set
    pub off_standard_count: usize,

    /// off_standard_count / sample_size
    pub off_standard_rate: f64,

    /// True when the off-standard share exceeds the baseline
    pub unusual: bool,
}

impl VatAnalysis {
    /// The unremarkable result used when the signal degrades
    pub fn neutral() -> Self {
        Self {
            sample_size: 0,
            off_standard_count: 0,
            off_standard_rate: 0.0,
            unusual: false,
        }
    }
}

/// Measure the share of VAT rates outside the tenant-standard set.
///
/// Below [`MIN_SAMPLE_SIZE`] rated transactions the result is never unusual.
pub fn analyze(rates: &[Decimal], standard_rates: &[Decimal]) -> VatAnalysis {
    if rates.is_empty() {
        return VatAnalysis::neutral();
    }

    let off_standard_count = rates
        .iter()
        .filter(|&rate| !standard_rates.contains(rate))
        .count();
    let off_standard_rate = off_standard_count as f64 / rates.len() as f64;

    VatAnalysis {
        sample_size: rates.len(),
        off_standard_count,
        off_standard_rate,
        unusual: rates.len() >= MIN_SAMPLE_SIZE && off_standard_rate > OFF_STANDARD_BASELINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimals(values: &[&str]) -> Vec<Decimal> {
        values.iter().map(|v| v.parse().unwrap()).collect()
    }

    #[test]
    fn test_standard_rates_are_normal() {
        let standard = decimals(&["0", "9", "21"]);
        let rates = decimals(&["21", "21", "9", "0", "21", "9", "21", "21", "9", "21"]);
        let analysis = analyze(&rates, &standard);
        assert_eq!(analysis.off_standard_count, 0);
        assert!(!analysis.unusual);
    }

    #[test]
    fn test_off_standard_share_is_unusual() {
        let standard = decimals(&["0", "9", "21"]);
        let rates = decimals(&[
            "21", "21", "13.5", "0", "17", "9", "21", "21", "16", "21", "21", "21",
        ]);
        let analysis = analyze(&rates, &standard);
        assert_eq!(analysis.off_standard_count, 3);
        assert!(analysis.unusual);
    }

    #[test]
    fn test_scale_differences_still_match() {
        let standard = decimals(&["21"]);
        let rates = decimals(&["21.0", "21.00"]);
        let analysis = analyze(&rates, &standard);
        assert_eq!(analysis.off_standard_count, 0);
    }

    #[test]
    fn test_small_sample_is_never_unusual() {
        let standard = decimals(&["21"]);
        let rates = decimals(&["13.5", "17"]);
        assert!(!analyze(&rates, &standard).unusual);
    }
}
