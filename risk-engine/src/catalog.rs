//! Rule catalog loading

use risk_core::{Error, Result, RiskRule, RuleScope, TenantId};
use serde_json::Value;
use tenant_data::RuleStore;
use tracing::debug;

/// The active rules of one tenant, partitioned by scope.
/// Immutable during an evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    pub document_rules: Vec<RiskRule>,
    pub company_rules: Vec<RiskRule>,
}

impl RuleCatalog {
    /// Load and validate the active rules of one tenant.
    ///
    /// A tenant with no configured rules gets an empty catalog, not an
    /// error; evaluations over an empty catalog score 0 with Low severity.
    pub fn load(store: &dyn RuleStore, tenant_id: TenantId) -> Result<Self> {
        let rules = store.active_rules(tenant_id)?;

        let mut catalog = RuleCatalog::default();
        for rule in rules {
            validate_rule(&rule)?;
            match rule.scope {
                RuleScope::Document => catalog.document_rules.push(rule),
                RuleScope::Company => catalog.company_rules.push(rule),
            }
        }

        debug!(
            %tenant_id,
            document_rules = catalog.document_rules.len(),
            company_rules = catalog.company_rules.len(),
            "loaded rule catalog"
        );
        Ok(catalog)
    }

    pub fn is_empty(&self) -> bool {
        self.document_rules.is_empty() && self.company_rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.document_rules.len() + self.company_rules.len()
    }
}

fn validate_rule(rule: &RiskRule) -> Result<()> {
    if rule.code.trim().is_empty() {
        return Err(Error::Validation("rule code must not be empty".to_string()));
    }
    if !rule.weight.is_finite() || rule.weight < 0.0 {
        return Err(Error::Validation(format!(
            "rule {} has invalid weight {}",
            rule.code, rule.weight
        )));
    }
    for (key, value) in &rule.config {
        if !matches!(value, Value::Number(_) | Value::Bool(_) | Value::String(_)) {
            return Err(Error::Validation(format!(
                "rule {} config key {} must be a number, bool or string",
                rule.code, key
            )));
        }
    }
    Ok(())
}
