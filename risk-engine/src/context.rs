//! Rule evaluation contexts
//!
//! The enriched inputs a predicate sees: stored feature data merged with
//! precomputed fraud signals. Contexts are built once per evaluation and
//! never mutated while rules run.

use chrono::{DateTime, Duration, Utc};
use fraud_patterns::{
    BackdatingAnalysis, BenfordAnalysis, CircularAnalysis, CounterpartyAnalysis, RoundNumberAnalysis,
    Signal, TimingAnalysis, VatAnalysis,
};
use risk_core::{FeatureValue, RiskRule};
use std::collections::HashMap;

/// Fraud signals computed for one document's company
#[derive(Debug, Clone)]
pub struct DocumentFraudSignals {
    pub benford: Signal<BenfordAnalysis>,
    pub round_numbers: Signal<RoundNumberAnalysis>,
    pub timing: Signal<TimingAnalysis>,
    pub counterparty: Signal<CounterpartyAnalysis>,
    pub duplicate_invoice: Signal<bool>,
}

impl DocumentFraudSignals {
    /// All signals at their neutral value
    pub fn neutral() -> Self {
        Self {
            benford: Signal::Computed(BenfordAnalysis::neutral()),
            round_numbers: Signal::Computed(RoundNumberAnalysis::neutral()),
            timing: Signal::Computed(TimingAnalysis::neutral()),
            counterparty: Signal::Computed(CounterpartyAnalysis::neutral()),
            duplicate_invoice: Signal::Computed(false),
        }
    }

    /// How many signals defaulted due to a failure
    pub fn degraded_count(&self) -> usize {
        [
            self.benford.is_degraded(),
            self.round_numbers.is_degraded(),
            self.timing.is_degraded(),
            self.counterparty.is_degraded(),
            self.duplicate_invoice.is_degraded(),
        ]
        .iter()
        .filter(|&&degraded| degraded)
        .count()
    }
}

/// Everything a document-scope predicate can look at
#[derive(Debug, Clone)]
pub struct DocumentRuleContext {
    /// Feature flags and measurements extracted upstream
    pub features: HashMap<String, FeatureValue>,

    /// Raw risk-flag codes from upstream heuristics
    pub risk_flags: Vec<String>,

    /// Precomputed fraud signals
    pub fraud: DocumentFraudSignals,
}

impl DocumentRuleContext {
    /// A boolean feature; absent or non-boolean counts as false
    pub fn bool_feature(&self, name: &str) -> bool {
        matches!(self.features.get(name), Some(FeatureValue::Bool(true)))
    }

    /// A numeric feature, if present
    pub fn number_feature(&self, name: &str) -> Option<f64> {
        match self.features.get(name) {
            Some(FeatureValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Whether upstream attached the given raw risk flag
    pub fn has_risk_flag(&self, code: &str) -> bool {
        self.risk_flags.iter().any(|flag| flag == code)
    }
}

/// Company-wide fraud signals
#[derive(Debug, Clone)]
pub struct CompanyFraudSignals {
    pub benford: Signal<BenfordAnalysis>,
    pub circular: Signal<CircularAnalysis>,
    pub vat: Signal<VatAnalysis>,
    pub backdating: Signal<BackdatingAnalysis>,
}

impl CompanyFraudSignals {
    /// All signals at their neutral value
    pub fn neutral() -> Self {
        Self {
            benford: Signal::Computed(BenfordAnalysis::neutral()),
            circular: Signal::Computed(CircularAnalysis::neutral()),
            vat: Signal::Computed(VatAnalysis::neutral()),
            backdating: Signal::Computed(BackdatingAnalysis::neutral()),
        }
    }

    /// Number of patterns that fired
    pub fn hits(&self) -> usize {
        [
            self.benford.value().violation,
            self.circular.value().detected,
            self.vat.value().unusual,
            self.backdating.value().detected,
        ]
        .iter()
        .filter(|&&hit| hit)
        .count()
    }

    /// How many signals defaulted due to a failure
    pub fn degraded_count(&self) -> usize {
        [
            self.benford.is_degraded(),
            self.circular.is_degraded(),
            self.vat.is_degraded(),
            self.backdating.is_degraded(),
        ]
        .iter()
        .filter(|&&degraded| degraded)
        .count()
    }
}

/// Everything a company-scope predicate can look at
#[derive(Debug, Clone)]
pub struct CompanyRuleContext {
    /// When the evaluation ran; per-rule window narrowing anchors here
    pub evaluated_at: DateTime<Utc>,

    /// Trailing window the aggregates were computed over
    pub window_days: u32,

    /// Invoices issued in-window
    pub invoice_count: usize,

    /// Invoices linked to documents currently scored High
    pub high_risk_invoice_count: usize,

    /// External invoice numbers occurring more than once
    pub duplicate_invoice_count: usize,

    /// Evaluation times of in-window document scores currently High
    pub high_risk_document_times: Vec<DateTime<Utc>>,

    /// Company-wide fraud signals
    pub fraud: CompanyFraudSignals,
}

impl CompanyRuleContext {
    /// High-severity document scores in the full window
    pub fn high_risk_document_count(&self) -> usize {
        self.high_risk_document_times.len()
    }

    /// High-severity document scores within a narrower trailing window
    pub fn high_risk_document_count_within(&self, days: u32) -> usize {
        let cutoff = self.evaluated_at - Duration::days(days as i64);
        self.high_risk_document_times
            .iter()
            .filter(|&&at| at >= cutoff)
            .count()
    }

    /// Share of in-window invoices linked to High documents
    pub fn high_risk_invoice_ratio(&self) -> f64 {
        if self.invoice_count == 0 {
            return 0.0;
        }
        self.high_risk_invoice_count as f64 / self.invoice_count as f64
    }

    /// Total fraud-pattern hits across the company signals
    pub fn fraud_pattern_hits(&self) -> usize {
        self.fraud.hits()
    }
}

/// A numeric rule-config value, falling back to the rule's default
pub fn config_number(rule: &RiskRule, key: &str, default: f64) -> f64 {
    rule.config
        .get(key)
        .and_then(|value| value.as_f64())
        .unwrap_or(default)
}
