//! Severity mapping
//!
//! The single threshold function shared by both evaluators. Severity is
//! never computed anywhere else and never stored apart from its score.

use crate::types::RiskScore;
use serde::{Deserialize, Serialize};

/// Severity bucket derived from a numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Score 0-30
    Low,
    /// Score 31-65
    Medium,
    /// Score 66-100
    High,
}

impl Severity {
    /// Map a score to its severity bucket
    pub fn of(score: RiskScore) -> Self {
        match score.value() {
            0..=30 => Severity::Low,
            31..=65 => Severity::Medium,
            _ => Severity::High,
        }
    }

    /// Stable string form used in logs and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl From<RiskScore> for Severity {
    fn from(score: RiskScore) -> Self {
        Severity::of(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(Severity::of(RiskScore::new(0)), Severity::Low);
        assert_eq!(Severity::of(RiskScore::new(30)), Severity::Low);
        assert_eq!(Severity::of(RiskScore::new(31)), Severity::Medium);
        assert_eq!(Severity::of(RiskScore::new(65)), Severity::Medium);
        assert_eq!(Severity::of(RiskScore::new(66)), Severity::High);
        assert_eq!(Severity::of(RiskScore::new(100)), Severity::High);
    }

    #[test]
    fn test_from_delegates() {
        assert_eq!(Severity::from(RiskScore::new(75)), Severity::High);
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }
}
