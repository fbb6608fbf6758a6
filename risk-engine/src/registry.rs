//! Predicate registry
//!
//! Rule codes dispatch to pure predicate functions over the rule context.
//! New rules are added by registration, not by growing a conditional. An
//! unrecognized document code falls back to the document's raw risk-flag
//! list; an unrecognized company code never triggers.

use crate::context::{config_number, CompanyRuleContext, DocumentRuleContext};
use fraud_patterns::counterparty::CounterpartyStatus;
use risk_core::RiskRule;
use std::collections::HashMap;
use tracing::debug;

/// Predicate over a document rule context
pub type DocumentPredicate = fn(&DocumentRuleContext, &RiskRule) -> bool;

/// Predicate over a company rule context
pub type CompanyPredicate = fn(&CompanyRuleContext, &RiskRule) -> bool;

/// Default threshold for `HIGH_RISK_DOC_COUNT`
pub const DEFAULT_HIGH_RISK_DOC_THRESHOLD: f64 = 3.0;

/// Default ratio for `HIGH_RISK_INVOICE_RATIO`
pub const DEFAULT_HIGH_RISK_INVOICE_RATIO: f64 = 0.2;

/// Default threshold for `DUPLICATE_INVOICE_COUNT`
pub const DEFAULT_DUPLICATE_INVOICE_THRESHOLD: f64 = 1.0;

/// Default threshold for `FRAUD_PATTERN_COUNT`
pub const DEFAULT_FRAUD_PATTERN_THRESHOLD: f64 = 1.0;

/// Registry of document-scope predicates
pub struct DocumentRuleRegistry {
    predicates: HashMap<&'static str, DocumentPredicate>,
}

impl DocumentRuleRegistry {
    /// The standard catalog of document rule codes
    pub fn standard() -> Self {
        let mut registry = Self {
            predicates: HashMap::new(),
        };
        registry.register("INV_DUE_BEFORE_ISSUE", |ctx, _| {
            ctx.bool_feature("dateInconsistency")
        });
        registry.register("INV_MISSING_COUNTERPARTY", |ctx, _| {
            ctx.bool_feature("missingCounterparty")
        });
        registry.register("INV_AMOUNT_MISMATCH", |ctx, _| {
            ctx.bool_feature("amountMismatch")
        });
        registry.register("BENFORD_DEVIATION", |ctx, _| {
            ctx.fraud.benford.value().violation
        });
        registry.register("ROUND_NUMBER_SUSPICIOUS", |ctx, _| {
            ctx.fraud.round_numbers.value().suspicious
        });
        registry.register("UNUSUAL_TIMING", |ctx, _| ctx.fraud.timing.value().unusual);
        registry.register("NEW_COUNTERPARTY", |ctx, _| {
            ctx.fraud.counterparty.value().status == CounterpartyStatus::New
        });
        registry.register("UNUSUAL_COUNTERPARTY", |ctx, _| {
            ctx.fraud.counterparty.value().is_unusual()
        });
        registry.register("DUPLICATE_INVOICE", |ctx, _| {
            *ctx.fraud.duplicate_invoice.value()
        });
        registry
    }

    /// Register or replace a predicate
    pub fn register(&mut self, code: &'static str, predicate: DocumentPredicate) {
        self.predicates.insert(code, predicate);
    }

    /// Evaluate one rule against the context
    pub fn evaluate(&self, rule: &RiskRule, ctx: &DocumentRuleContext) -> bool {
        match self.predicates.get(rule.code.as_str()) {
            Some(predicate) => predicate(ctx, rule),
            None => {
                debug!(code = %rule.code, "unregistered document rule, matching raw risk flags");
                ctx.has_risk_flag(&rule.code)
            }
        }
    }
}

impl Default for DocumentRuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Registry of company-scope predicates
pub struct CompanyRuleRegistry {
    predicates: HashMap<&'static str, CompanyPredicate>,
}

impl CompanyRuleRegistry {
    /// The standard catalog of company rule codes
    pub fn standard() -> Self {
        let mut registry = Self {
            predicates: HashMap::new(),
        };
        registry.register("HIGH_RISK_DOC_COUNT", |ctx, rule| {
            let threshold = config_number(rule, "threshold", DEFAULT_HIGH_RISK_DOC_THRESHOLD);
            let window_days = config_number(rule, "windowDays", ctx.window_days as f64);
            ctx.high_risk_document_count_within(window_days as u32) as f64 > threshold
        });
        registry.register("HIGH_RISK_INVOICE_RATIO", |ctx, rule| {
            let ratio = config_number(rule, "ratio", DEFAULT_HIGH_RISK_INVOICE_RATIO);
            ctx.invoice_count > 0 && ctx.high_risk_invoice_ratio() > ratio
        });
        registry.register("DUPLICATE_INVOICE_COUNT", |ctx, rule| {
            let threshold = config_number(rule, "threshold", DEFAULT_DUPLICATE_INVOICE_THRESHOLD);
            ctx.duplicate_invoice_count as f64 > threshold
        });
        registry.register("FRAUD_PATTERN_COUNT", |ctx, rule| {
            let threshold = config_number(rule, "threshold", DEFAULT_FRAUD_PATTERN_THRESHOLD);
            ctx.fraud_pattern_hits() as f64 > threshold
        });
        registry.register("BENFORD_COMPANY_WIDE", |ctx, _| {
            ctx.fraud.benford.value().violation
        });
        registry.register("CIRCULAR_TRANSACTIONS", |ctx, _| {
            ctx.fraud.circular.value().detected
        });
        registry.register("VAT_RATE_ANOMALY", |ctx, _| ctx.fraud.vat.value().unusual);
        registry.register("DATE_MANIPULATION", |ctx, _| {
            ctx.fraud.backdating.value().detected
        });
        registry
    }

    /// Register or replace a predicate
    pub fn register(&mut self, code: &'static str, predicate: CompanyPredicate) {
        self.predicates.insert(code, predicate);
    }

    /// Evaluate one rule against the context. Companies carry no raw flag
    /// list, so an unrecognized code never triggers.
    pub fn evaluate(&self, rule: &RiskRule, ctx: &CompanyRuleContext) -> bool {
        match self.predicates.get(rule.code.as_str()) {
            Some(predicate) => predicate(ctx, rule),
            None => {
                debug!(code = %rule.code, "unregistered company rule never triggers");
                false
            }
        }
    }
}

impl Default for CompanyRuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompanyFraudSignals, DocumentFraudSignals};
    use chrono::Utc;
    use risk_core::{FeatureValue, RuleScope};
    use serde_json::json;
    use std::collections::HashMap;

    fn document_ctx() -> DocumentRuleContext {
        DocumentRuleContext {
            features: HashMap::from([(
                "dateInconsistency".to_string(),
                FeatureValue::Bool(true),
            )]),
            risk_flags: vec!["LEGACY_FLAG".to_string()],
            fraud: DocumentFraudSignals::neutral(),
        }
    }

    fn company_ctx() -> CompanyRuleContext {
        CompanyRuleContext {
            evaluated_at: Utc::now(),
            window_days: 90,
            invoice_count: 10,
            high_risk_invoice_count: 3,
            duplicate_invoice_count: 2,
            high_risk_document_times: vec![Utc::now(); 4],
            fraud: CompanyFraudSignals::neutral(),
        }
    }

    #[test]
    fn test_registered_document_code() {
        let registry = DocumentRuleRegistry::standard();
        let rule = RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 40.0);
        assert!(registry.evaluate(&rule, &document_ctx()));
    }

    #[test]
    fn test_unknown_document_code_falls_back_to_flags() {
        let registry = DocumentRuleRegistry::standard();
        let known_flag = RiskRule::new("LEGACY_FLAG", RuleScope::Document, 10.0);
        let unknown = RiskRule::new("NEVER_SEEN", RuleScope::Document, 10.0);
        assert!(registry.evaluate(&known_flag, &document_ctx()));
        assert!(!registry.evaluate(&unknown, &document_ctx()));
    }

    #[test]
    fn test_company_threshold_configurable() {
        let registry = CompanyRuleRegistry::standard();
        let ctx = company_ctx();

        let default_rule = RiskRule::new("HIGH_RISK_DOC_COUNT", RuleScope::Company, 50.0);
        assert!(registry.evaluate(&default_rule, &ctx)); // 4 > 3

        let strict = RiskRule::new("HIGH_RISK_DOC_COUNT", RuleScope::Company, 50.0)
            .with_config("threshold", json!(10));
        assert!(!registry.evaluate(&strict, &ctx));
    }

    #[test]
    fn test_company_ratio_rule() {
        let registry = CompanyRuleRegistry::standard();
        let rule = RiskRule::new("HIGH_RISK_INVOICE_RATIO", RuleScope::Company, 30.0);
        assert!(registry.evaluate(&rule, &company_ctx())); // 0.3 > 0.2
    }

    #[test]
    fn test_unknown_company_code_never_triggers() {
        let registry = CompanyRuleRegistry::standard();
        let rule = RiskRule::new("NEVER_SEEN", RuleScope::Company, 10.0);
        assert!(!registry.evaluate(&rule, &company_ctx()));
    }

    #[test]
    fn test_duplicate_invoice_count_rule() {
        let registry = CompanyRuleRegistry::standard();
        let rule = RiskRule::new("DUPLICATE_INVOICE_COUNT", RuleScope::Company, 25.0);
        assert!(registry.evaluate(&rule, &company_ctx())); // 2 > 1
    }
}
