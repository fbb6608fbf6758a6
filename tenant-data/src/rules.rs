use dashmap::DashMap;
use risk_core::{Result, RiskRule, TenantId};

/// Read side of the rule catalog
pub trait RuleStore: Send + Sync {
    /// Active rules for one tenant. A tenant with no configured rules gets
    /// an empty set, not an error.
    fn active_rules(&self, tenant_id: TenantId) -> Result<Vec<RiskRule>>;
}

/// In-memory rule store keyed by tenant
#[derive(Default)]
pub struct InMemoryRuleStore {
    rules: DashMap<TenantId, Vec<RiskRule>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full rule set of one tenant
    pub fn put_rules(&self, tenant_id: TenantId, rules: Vec<RiskRule>) {
        self.rules.insert(tenant_id, rules);
    }

    /// Append one rule to a tenant's set
    pub fn push_rule(&self, tenant_id: TenantId, rule: RiskRule) {
        self.rules.entry(tenant_id).or_default().push(rule);
    }
}

impl RuleStore for InMemoryRuleStore {
    fn active_rules(&self, tenant_id: TenantId) -> Result<Vec<RiskRule>> {
        Ok(self
            .rules
            .get(&tenant_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|rule| rule.active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::RuleScope;

    #[test]
    fn test_inactive_rules_are_filtered() {
        let store = InMemoryRuleStore::new();
        let tenant = TenantId::generate();
        let mut dormant = RiskRule::new("DORMANT", RuleScope::Document, 10.0);
        dormant.active = false;
        store.put_rules(
            tenant,
            vec![RiskRule::new("LIVE", RuleScope::Document, 20.0), dormant],
        );

        let rules = store.active_rules(tenant).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].code, "LIVE");
    }

    #[test]
    fn test_unconfigured_tenant_gets_empty_set() {
        let store = InMemoryRuleStore::new();
        assert!(store.active_rules(TenantId::generate()).unwrap().is_empty());
    }

    #[test]
    fn test_tenants_do_not_share_rules() {
        let store = InMemoryRuleStore::new();
        let tenant_a = TenantId::generate();
        let tenant_b = TenantId::generate();
        store.push_rule(tenant_a, RiskRule::new("ONLY_A", RuleScope::Company, 5.0));

        assert!(store.active_rules(tenant_b).unwrap().is_empty());
    }
}
