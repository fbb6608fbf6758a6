//! Client-company risk evaluation

use crate::alerts::{AlertDispatcher, AlertRequest};
use crate::catalog::RuleCatalog;
use crate::config::EngineConfig;
use crate::context::CompanyRuleContext;
use crate::metrics::Metrics;
use crate::registry::CompanyRuleRegistry;
use crate::signals;
use chrono::{DateTime, Duration, Utc};
use fraud_patterns::duplicates;
use risk_core::{
    ClientCompanyId, ClientCompanyRiskScore, EntityType, Result, RiskScore,
    RiskScoreHistoryEntry, Severity, TenantId,
};
use score_store::{CurrentScore, ScoreStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tenant_data::{FeatureStore, LedgerStore, RuleStore};
use tracing::{info, warn};

/// Evaluates client companies against the tenant's company-scope rules
pub struct ClientCompanyRiskEvaluator {
    rules: Arc<dyn RuleStore>,
    features: Arc<dyn FeatureStore>,
    ledger: Arc<dyn LedgerStore>,
    scores: Arc<dyn ScoreStore>,
    alerts: Arc<dyn AlertDispatcher>,
    registry: CompanyRuleRegistry,
    config: EngineConfig,
    metrics: Metrics,
}

impl ClientCompanyRiskEvaluator {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        features: Arc<dyn FeatureStore>,
        ledger: Arc<dyn LedgerStore>,
        scores: Arc<dyn ScoreStore>,
        alerts: Arc<dyn AlertDispatcher>,
        config: EngineConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            rules,
            features,
            ledger,
            scores,
            alerts,
            registry: CompanyRuleRegistry::standard(),
            config,
            metrics,
        }
    }

    /// Score one client company over the trailing window.
    ///
    /// Aggregates and fraud signals each degrade independently: a failing
    /// sub-analysis contributes "no patterns found" instead of aborting the
    /// evaluation.
    pub async fn evaluate(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
    ) -> Result<ClientCompanyRiskScore> {
        let start = Instant::now();

        let catalog = RuleCatalog::load(self.rules.as_ref(), tenant_id)?;

        let evaluated_at = Utc::now();
        let window_days = self.config.window.company_window_days;
        let window_start = evaluated_at - Duration::days(window_days as i64);

        let invoices = match self.ledger.company_invoices(
            tenant_id,
            client_company_id,
            window_start.date_naive(),
            evaluated_at.date_naive(),
        ) {
            Ok(invoices) => invoices,
            Err(e) => {
                warn!(%tenant_id, %client_company_id, error = %e, "invoice fetch degraded");
                self.metrics.record_degraded_signals(1);
                Vec::new()
            }
        };

        let (high_risk_document_times, high_risk_documents) =
            self.high_risk_documents(tenant_id, client_company_id, window_start);

        let high_risk_invoice_count = invoices
            .iter()
            .filter(|invoice| {
                invoice
                    .document_id
                    .map(|id| high_risk_documents.contains(&id))
                    .unwrap_or(false)
            })
            .count();

        let duplicate_invoice_count = duplicates::duplicate_external_number_count(
            invoices
                .iter()
                .filter_map(|invoice| invoice.external_number.as_deref()),
        );

        let transactions = self.ledger.company_transactions(
            tenant_id,
            client_company_id,
            window_start,
            evaluated_at,
        );
        let fraud = signals::company_signals(&transactions, &self.config, &self.metrics);

        let ctx = CompanyRuleContext {
            evaluated_at,
            window_days,
            invoice_count: invoices.len(),
            high_risk_invoice_count,
            duplicate_invoice_count,
            high_risk_document_times,
            fraud,
        };

        let mut triggered_rule_codes = Vec::new();
        let mut weight_sum = 0.0;
        for rule in &catalog.company_rules {
            if self.registry.evaluate(rule, &ctx) {
                triggered_rule_codes.push(rule.code.clone());
                weight_sum += rule.weight;
            }
        }
        triggered_rule_codes.sort();

        let score = RiskScore::from_weight_sum(weight_sum);
        let severity = Severity::of(score);

        self.scores.upsert_current(
            tenant_id,
            EntityType::ClientCompany,
            client_company_id.as_uuid(),
            CurrentScore {
                score,
                severity,
                triggered_rule_codes: triggered_rule_codes.clone(),
                generated_at: evaluated_at,
            },
        )?;
        self.scores.append_history(RiskScoreHistoryEntry {
            tenant_id,
            entity_type: EntityType::ClientCompany,
            entity_id: client_company_id.as_uuid(),
            score,
            severity,
            created_at: evaluated_at,
        })?;

        if severity == Severity::High {
            info!(
                %tenant_id,
                %client_company_id,
                score = score.value(),
                triggered = triggered_rule_codes.len(),
                "company scored HIGH"
            );
            self.emit_alert(tenant_id, client_company_id, score, severity);
        }

        self.metrics.record_company_evaluation();
        self.metrics
            .record_evaluation_duration(start.elapsed().as_secs_f64());

        Ok(ClientCompanyRiskScore {
            client_company_id,
            score,
            severity,
            triggered_rule_codes,
            generated_at: evaluated_at,
        })
    }

    /// Current document scores of this company that stand at High: their
    /// in-window evaluation times, plus the full id set for invoice linkage.
    fn high_risk_documents(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
        window_start: DateTime<Utc>,
    ) -> (Vec<DateTime<Utc>>, HashSet<risk_core::DocumentId>) {
        let document_ids = match self.features.company_documents(tenant_id, client_company_id) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(%tenant_id, %client_company_id, error = %e, "document listing degraded");
                self.metrics.record_degraded_signals(1);
                Vec::new()
            }
        };

        let mut times = Vec::new();
        let mut high = HashSet::new();
        for document_id in document_ids {
            let current = match self.scores.current(
                tenant_id,
                EntityType::Document,
                document_id.as_uuid(),
            ) {
                Ok(current) => current,
                Err(e) => {
                    warn!(%tenant_id, %document_id, error = %e, "score lookup degraded");
                    self.metrics.record_degraded_signals(1);
                    continue;
                }
            };
            if let Some(record) = current {
                if record.severity == Severity::High {
                    high.insert(document_id);
                    if record.generated_at >= window_start {
                        times.push(record.generated_at);
                    }
                }
            }
        }
        (times, high)
    }

    fn emit_alert(
        &self,
        tenant_id: TenantId,
        client_company_id: ClientCompanyId,
        score: RiskScore,
        severity: Severity,
    ) {
        if !self.config.alerting.enabled {
            return;
        }
        let request = AlertRequest {
            tenant_id,
            client_company_id,
            document_id: None,
            alert_type: "companyRiskHigh".to_string(),
            title: "High risk client company".to_string(),
            message: format!("Client company scored {} ({})", score, severity.as_str()),
            severity,
        };
        if let Err(e) = self.alerts.dispatch(request) {
            warn!(%tenant_id, %client_company_id, error = %e, "alert dispatch failed");
        } else {
            self.metrics.record_alert();
        }
    }
}
