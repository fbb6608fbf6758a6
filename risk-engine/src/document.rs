//! Document risk evaluation

use crate::alerts::{AlertDispatcher, AlertRequest};
use crate::catalog::RuleCatalog;
use crate::config::EngineConfig;
use crate::context::DocumentRuleContext;
use crate::metrics::Metrics;
use crate::registry::DocumentRuleRegistry;
use crate::signals;
use chrono::Utc;
use risk_core::{
    DocumentId, DocumentRiskFeatures, DocumentRiskScore, EntityType, Error, Result, RiskScore,
    RiskScoreHistoryEntry, Severity, TenantId,
};
use score_store::{CurrentScore, ScoreStore};
use std::sync::Arc;
use std::time::Instant;
use tenant_data::{FeatureStore, LedgerStore, RuleStore};
use tracing::{info, warn};

/// Evaluates single documents against the tenant's document-scope rules
pub struct DocumentRiskEvaluator {
    rules: Arc<dyn RuleStore>,
    features: Arc<dyn FeatureStore>,
    ledger: Arc<dyn LedgerStore>,
    scores: Arc<dyn ScoreStore>,
    alerts: Arc<dyn AlertDispatcher>,
    registry: DocumentRuleRegistry,
    config: EngineConfig,
    metrics: Metrics,
}

impl DocumentRiskEvaluator {
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
            registry: DocumentRuleRegistry::standard(),
            config,
            metrics,
        }
    }

    /// Score one document.
    ///
    /// Features come from the caller when it already holds them, otherwise
    /// from the feature store; a missing record is fatal. A degraded fraud
    /// signal is not: it falls back to neutral and scoring continues.
    pub async fn evaluate(
        &self,
        tenant_id: TenantId,
        document_id: DocumentId,
        supplied: Option<DocumentRiskFeatures>,
    ) -> Result<DocumentRiskScore> {
        let start = Instant::now();

        let features = match supplied {
            Some(features) => {
                if features.document_id != document_id {
                    return Err(Error::FatalData(format!(
                        "supplied features describe document {}, not {}",
                        features.document_id, document_id
                    )));
                }
                features
            }
            None => self.features.document_features(tenant_id, document_id)?,
        };
        let client_company_id = features.client_company_id;

        let catalog = RuleCatalog::load(self.rules.as_ref(), tenant_id)?;

        let generated_at = Utc::now();
        let fraud = signals::document_signals(
            self.ledger.as_ref(),
            tenant_id,
            client_company_id,
            document_id,
            &self.config,
            &self.metrics,
            generated_at,
        );

        let ctx = DocumentRuleContext {
            features: features.features,
            risk_flags: features
                .risk_flags
                .into_iter()
                .map(|flag| flag.code)
                .collect(),
            fraud,
        };

        let mut triggered_rule_codes = Vec::new();
        let mut weight_sum = 0.0;
        for rule in &catalog.document_rules {
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
            EntityType::Document,
            document_id.as_uuid(),
            CurrentScore {
                score,
                severity,
                triggered_rule_codes: triggered_rule_codes.clone(),
                generated_at,
            },
        )?;
        self.scores.append_history(RiskScoreHistoryEntry {
            tenant_id,
            entity_type: EntityType::Document,
            entity_id: document_id.as_uuid(),
            score,
            severity,
            created_at: generated_at,
        })?;

        if severity == Severity::High {
            info!(
                %tenant_id,
                %document_id,
                score = score.value(),
                triggered = triggered_rule_codes.len(),
                "document scored HIGH"
            );
            self.emit_alert(tenant_id, client_company_id, document_id, score, severity);
        }

        self.metrics.record_document_evaluation();
        self.metrics
            .record_evaluation_duration(start.elapsed().as_secs_f64());

        Ok(DocumentRiskScore {
            document_id,
            score,
            severity,
            triggered_rule_codes,
            generated_at,
        })
    }

    fn emit_alert(
        &self,
        tenant_id: TenantId,
        client_company_id: risk_core::ClientCompanyId,
        document_id: DocumentId,
        score: RiskScore,
        severity: Severity,
    ) {
        if !self.config.alerting.enabled {
            return;
        }
        let request = AlertRequest {
            tenant_id,
            client_company_id,
            document_id: Some(document_id),
            alert_type: "documentRiskHigh".to_string(),
            title: "High risk document".to_string(),
            message: format!("Document scored {} ({})", score, severity.as_str()),
            severity,
        };
        if let Err(e) = self.alerts.dispatch(request) {
            warn!(%tenant_id, %document_id, error = %e, "alert dispatch failed");
        } else {
            self.metrics.record_alert();
        }
    }
}
