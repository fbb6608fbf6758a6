//! Integration tests for the document and company evaluators

use chrono::{Duration, Utc};
use risk_core::{
    ClientCompanyId, DocumentId, DocumentRiskFeatures, EntityType, Error, EvaluationJob,
    FeatureValue, Invoice, InvoiceId, RiskFlag, RiskRule, RuleScope, Severity, TenantId,
    Transaction,
};
use risk_engine::{
    ClientCompanyRiskEvaluator, DocumentRiskEvaluator, EngineConfig, JobOutcome, JobRunner,
    Metrics, RecordingAlertDispatcher,
};
use rust_decimal::Decimal;
use score_store::{InMemoryScoreStore, ScoreStore};
use std::collections::HashMap;
use std::sync::Arc;
use tenant_data::{
    InMemoryFeatureStore, InMemoryLedgerStore, InMemoryRuleStore, LedgerStore,
};
use uuid::Uuid;

struct Harness {
    tenant: TenantId,
    rules: Arc<InMemoryRuleStore>,
    features: Arc<InMemoryFeatureStore>,
    ledger: Arc<InMemoryLedgerStore>,
    scores: Arc<InMemoryScoreStore>,
    alerts: Arc<RecordingAlertDispatcher>,
    documents: DocumentRiskEvaluator,
    companies: ClientCompanyRiskEvaluator,
}

fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

fn harness_with(config: EngineConfig) -> Harness {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();

    let rules = Arc::new(InMemoryRuleStore::new());
    let features = Arc::new(InMemoryFeatureStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new());
    let scores = Arc::new(InMemoryScoreStore::new());
    let alerts = Arc::new(RecordingAlertDispatcher::new());
    let metrics = Metrics::new().unwrap();

    let documents = DocumentRiskEvaluator::new(
        rules.clone(),
        features.clone(),
        ledger.clone(),
        scores.clone(),
        alerts.clone(),
        config.clone(),
        metrics.clone(),
    );
    let companies = ClientCompanyRiskEvaluator::new(
        rules.clone(),
        features.clone(),
        ledger.clone(),
        scores.clone(),
        alerts.clone(),
        config,
        metrics,
    );

    Harness {
        tenant: TenantId::generate(),
        rules,
        features,
        ledger,
        scores,
        alerts,
        documents,
        companies,
    }
}

fn doc_features(
    document_id: DocumentId,
    client_company_id: ClientCompanyId,
    flags: &[(&str, bool)],
) -> DocumentRiskFeatures {
    DocumentRiskFeatures {
        document_id,
        client_company_id,
        features: flags
            .iter()
            .map(|(name, value)| (name.to_string(), FeatureValue::Bool(*value)))
            .collect(),
        risk_flags: Vec::new(),
        risk_score: None,
    }
}

fn transaction(company: ClientCompanyId, amount: &str, days_ago: i64) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        client_company_id: company,
        counterparty: None,
        amount: amount.parse().unwrap(),
        vat_rate: None,
        booked_at: Utc::now() - Duration::days(days_ago),
        entered_at: None,
    }
}

fn invoice(
    company: ClientCompanyId,
    document_id: Option<DocumentId>,
    external_number: Option<&str>,
    amount: &str,
    days_ago: i64,
) -> Invoice {
    Invoice {
        id: InvoiceId::generate(),
        client_company_id: company,
        document_id,
        external_number: external_number.map(str::to_string),
        counterparty: None,
        amount: amount.parse().unwrap(),
        issued_on: (Utc::now() - Duration::days(days_ago)).date_naive(),
        due_on: None,
    }
}

#[tokio::test]
async fn end_to_end_example_scores_seventy_five_high() -> anyhow::Result<()> {
    let h = harness();
    let company = ClientCompanyId::generate();
    let document = DocumentId::generate();

    h.rules.put_rules(
        h.tenant,
        vec![
            RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 40.0),
            RiskRule::new("ROUND_NUMBER_SUSPICIOUS", RuleScope::Document, 35.0),
        ],
    );
    h.features.put(
        h.tenant,
        doc_features(document, company, &[("dateInconsistency", true)]),
    );
    // 4 of 10 recent amounts are round: round-number suspicion fires
    for (i, amount) in ["1000", "2000", "5000", "3000"].iter().enumerate() {
        h.ledger
            .add_transaction(h.tenant, transaction(company, amount, 5 + i as i64));
    }
    for (i, amount) in ["123.45", "678.90", "432.10", "87.65", "54.32", "19.99"]
        .iter()
        .enumerate()
    {
        h.ledger
            .add_transaction(h.tenant, transaction(company, amount, 30 + i as i64));
    }

    let result = h.documents.evaluate(h.tenant, document, None).await?;

    assert_eq!(result.score.value(), 75);
    assert_eq!(result.severity, Severity::High);
    assert_eq!(
        result.triggered_rule_codes,
        vec!["INV_DUE_BEFORE_ISSUE", "ROUND_NUMBER_SUSPICIOUS"]
    );

    // High severity emitted exactly one alert carrying the document id
    let alerts = h.alerts.sent();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].document_id, Some(document));
    assert_eq!(alerts[0].client_company_id, company);
    Ok(())
}

#[tokio::test]
async fn no_rules_means_score_zero_low() -> anyhow::Result<()> {
    let h = harness();
    let document = DocumentId::generate();
    h.features.put(
        h.tenant,
        doc_features(document, ClientCompanyId::generate(), &[]),
    );

    let result = h.documents.evaluate(h.tenant, document, None).await?;

    assert_eq!(result.score.value(), 0);
    assert_eq!(result.severity, Severity::Low);
    assert!(result.triggered_rule_codes.is_empty());
    assert_eq!(h.alerts.count(), 0);

    // The evaluation still lands in the store and the history
    let history = h
        .scores
        .history(h.tenant, EntityType::Document, document.as_uuid())?;
    assert_eq!(history.len(), 1);
    Ok(())
}

#[tokio::test]
async fn cross_tenant_lookup_fails_closed() {
    let h = harness();
    let owner = TenantId::generate();
    let document = DocumentId::generate();
    h.features.put(
        owner,
        doc_features(document, ClientCompanyId::generate(), &[]),
    );

    let probe = h.documents.evaluate(h.tenant, document, None).await;
    assert!(matches!(probe, Err(Error::NotFound)));

    // Nothing was scored or recorded for the probing tenant
    assert!(h
        .scores
        .current(h.tenant, EntityType::Document, document.as_uuid())
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn supplied_features_for_wrong_document_are_fatal() {
    let h = harness();
    let features = doc_features(DocumentId::generate(), ClientCompanyId::generate(), &[]);

    let result = h
        .documents
        .evaluate(h.tenant, DocumentId::generate(), Some(features))
        .await;
    assert!(matches!(result, Err(Error::FatalData(_))));
}

#[tokio::test]
async fn history_accumulates_while_current_reflects_latest() -> anyhow::Result<()> {
    let h = harness();
    let document = DocumentId::generate();
    h.features.put(
        h.tenant,
        doc_features(
            document,
            ClientCompanyId::generate(),
            &[("dateInconsistency", true)],
        ),
    );

    for weight in [40.0, 55.0, 70.0] {
        h.rules.put_rules(
            h.tenant,
            vec![RiskRule::new(
                "INV_DUE_BEFORE_ISSUE",
                RuleScope::Document,
                weight,
            )],
        );
        h.documents.evaluate(h.tenant, document, None).await?;
    }

    let history = h
        .scores
        .history(h.tenant, EntityType::Document, document.as_uuid())?;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].score.value(), 40);
    assert_eq!(history[2].score.value(), 70);

    let current = h
        .scores
        .current(h.tenant, EntityType::Document, document.as_uuid())?
        .unwrap();
    assert_eq!(current.score.value(), 70);
    Ok(())
}

#[tokio::test]
async fn reevaluation_is_idempotent() -> anyhow::Result<()> {
    let h = harness();
    let document = DocumentId::generate();
    h.rules.put_rules(
        h.tenant,
        vec![
            RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 25.0),
            RiskRule::new("INV_MISSING_COUNTERPARTY", RuleScope::Document, 15.0),
        ],
    );
    h.features.put(
        h.tenant,
        doc_features(
            document,
            ClientCompanyId::generate(),
            &[("dateInconsistency", true), ("missingCounterparty", true)],
        ),
    );

    let first = h.documents.evaluate(h.tenant, document, None).await?;
    let second = h.documents.evaluate(h.tenant, document, None).await?;

    assert_eq!(first.score, second.score);
    assert_eq!(first.triggered_rule_codes, second.triggered_rule_codes);
    Ok(())
}

#[tokio::test]
async fn unknown_document_code_matches_raw_risk_flags() -> anyhow::Result<()> {
    let h = harness();
    let document = DocumentId::generate();
    h.rules.put_rules(
        h.tenant,
        vec![RiskRule::new("CUSTOM_TENANT_FLAG", RuleScope::Document, 20.0)],
    );
    let mut features = doc_features(document, ClientCompanyId::generate(), &[]);
    features.risk_flags.push(RiskFlag {
        code: "CUSTOM_TENANT_FLAG".to_string(),
    });
    h.features.put(h.tenant, features);

    let result = h.documents.evaluate(h.tenant, document, None).await?;
    assert_eq!(result.score.value(), 20);
    assert_eq!(result.triggered_rule_codes, vec!["CUSTOM_TENANT_FLAG"]);
    Ok(())
}

#[tokio::test]
async fn weight_sum_clamps_at_one_hundred() -> anyhow::Result<()> {
    let h = harness();
    let document = DocumentId::generate();
    h.rules.put_rules(
        h.tenant,
        vec![
            RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 80.0),
            RiskRule::new("INV_MISSING_COUNTERPARTY", RuleScope::Document, 50.0),
        ],
    );
    h.features.put(
        h.tenant,
        doc_features(
            document,
            ClientCompanyId::generate(),
            &[("dateInconsistency", true), ("missingCounterparty", true)],
        ),
    );

    let result = h.documents.evaluate(h.tenant, document, None).await?;
    assert_eq!(result.score.value(), 100);
    assert_eq!(result.severity, Severity::High);
    Ok(())
}

#[tokio::test]
async fn medium_severity_emits_no_alert() -> anyhow::Result<()> {
    let h = harness();
    let document = DocumentId::generate();
    h.rules.put_rules(
        h.tenant,
        vec![RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 50.0)],
    );
    h.features.put(
        h.tenant,
        doc_features(
            document,
            ClientCompanyId::generate(),
            &[("dateInconsistency", true)],
        ),
    );

    let result = h.documents.evaluate(h.tenant, document, None).await?;
    assert_eq!(result.severity, Severity::Medium);
    assert_eq!(h.alerts.count(), 0);
    Ok(())
}

#[tokio::test]
async fn disabled_alerting_suppresses_high_alerts() -> anyhow::Result<()> {
    let mut config = EngineConfig::default();
    config.alerting.enabled = false;
    let h = harness_with(config);
    let document = DocumentId::generate();
    h.rules.put_rules(
        h.tenant,
        vec![RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 70.0)],
    );
    h.features.put(
        h.tenant,
        doc_features(
            document,
            ClientCompanyId::generate(),
            &[("dateInconsistency", true)],
        ),
    );

    let result = h.documents.evaluate(h.tenant, document, None).await?;
    assert_eq!(result.severity, Severity::High);
    assert_eq!(h.alerts.count(), 0);
    Ok(())
}

/// Ledger that fails every fetch with a transient error
struct FailingLedgerStore;

impl LedgerStore for FailingLedgerStore {
    fn company_invoices(
        &self,
        _: TenantId,
        _: ClientCompanyId,
        _: chrono::NaiveDate,
        _: chrono::NaiveDate,
    ) -> risk_core::Result<Vec<Invoice>> {
        Err(Error::TransientDependency("ledger offline".to_string()))
    }

    fn tenant_invoices(
        &self,
        _: TenantId,
        _: chrono::NaiveDate,
        _: chrono::NaiveDate,
    ) -> risk_core::Result<Vec<Invoice>> {
        Err(Error::TransientDependency("ledger offline".to_string()))
    }

    fn company_transactions(
        &self,
        _: TenantId,
        _: ClientCompanyId,
        _: chrono::DateTime<Utc>,
        _: chrono::DateTime<Utc>,
    ) -> risk_core::Result<Vec<Transaction>> {
        Err(Error::TransientDependency("ledger offline".to_string()))
    }
}

#[tokio::test]
async fn failing_detectors_degrade_without_aborting() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
    let rules = Arc::new(InMemoryRuleStore::new());
    let features = Arc::new(InMemoryFeatureStore::new());
    let scores = Arc::new(InMemoryScoreStore::new());
    let alerts = Arc::new(RecordingAlertDispatcher::new());
    let metrics = Metrics::new().unwrap();
    let documents = DocumentRiskEvaluator::new(
        rules.clone(),
        features.clone(),
        Arc::new(FailingLedgerStore),
        scores.clone(),
        alerts,
        EngineConfig::default(),
        metrics.clone(),
    );

    let tenant = TenantId::generate();
    let document = DocumentId::generate();
    rules.put_rules(
        tenant,
        vec![
            RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 40.0),
            RiskRule::new("ROUND_NUMBER_SUSPICIOUS", RuleScope::Document, 35.0),
        ],
    );
    features.put(
        tenant,
        doc_features(
            document,
            ClientCompanyId::generate(),
            &[("dateInconsistency", true)],
        ),
    );

    // Every fraud signal degrades to neutral; the feature rule still scores
    let result = documents.evaluate(tenant, document, None).await?;
    assert_eq!(result.score.value(), 40);
    assert_eq!(result.triggered_rule_codes, vec!["INV_DUE_BEFORE_ISSUE"]);
    assert!(metrics.degraded_signals.get() >= 5);
    Ok(())
}

#[tokio::test]
async fn company_evaluation_aggregates_documents_and_invoices() -> anyhow::Result<()> {
    let h = harness();
    let company = ClientCompanyId::generate();
    let document = DocumentId::generate();

    h.rules.put_rules(
        h.tenant,
        vec![
            RiskRule::new("INV_DUE_BEFORE_ISSUE", RuleScope::Document, 70.0),
            RiskRule::new("HIGH_RISK_DOC_COUNT", RuleScope::Company, 40.0)
                .with_config("threshold", serde_json::json!(0)),
            RiskRule::new("DUPLICATE_INVOICE_COUNT", RuleScope::Company, 30.0)
                .with_config("threshold", serde_json::json!(0)),
        ],
    );
    h.features.put(
        h.tenant,
        doc_features(document, company, &[("dateInconsistency", true)]),
    );
    h.ledger.add_invoice(
        h.tenant,
        invoice(company, Some(document), Some("INV-100"), "750.00", 10),
    );
    h.ledger.add_invoice(
        h.tenant,
        invoice(company, None, Some("INV-7"), "120.00", 20),
    );
    h.ledger.add_invoice(
        h.tenant,
        invoice(company, None, Some("INV-7"), "340.00", 25),
    );

    // The document must be scored High before the company aggregates see it
    let doc_result = h.documents.evaluate(h.tenant, document, None).await?;
    assert_eq!(doc_result.severity, Severity::High);

    let result = h.companies.evaluate(h.tenant, company).await?;
    assert_eq!(result.score.value(), 70);
    assert_eq!(result.severity, Severity::High);
    assert_eq!(
        result.triggered_rule_codes,
        vec!["DUPLICATE_INVOICE_COUNT", "HIGH_RISK_DOC_COUNT"]
    );

    // One alert for the High document, one for the High company
    let alerts = h.alerts.sent();
    assert_eq!(alerts.len(), 2);
    assert!(alerts[1].document_id.is_none());
    assert_eq!(alerts[1].client_company_id, company);

    let history = h
        .scores
        .history(h.tenant, EntityType::ClientCompany, company.as_uuid())?;
    assert_eq!(history.len(), 1);
    Ok(())
}

#[tokio::test]
async fn company_with_no_data_scores_zero() -> anyhow::Result<()> {
    let h = harness();
    let result = h
        .companies
        .evaluate(h.tenant, ClientCompanyId::generate())
        .await?;
    assert_eq!(result.score.value(), 0);
    assert_eq!(result.severity, Severity::Low);
    Ok(())
}

#[tokio::test]
async fn job_runner_routes_by_payload() -> anyhow::Result<()> {
    let h = harness();
    let company = ClientCompanyId::generate();
    let document = DocumentId::generate();
    h.features
        .put(h.tenant, doc_features(document, company, &[]));

    let runner = JobRunner::new(
        Arc::new(h.documents),
        Arc::new(h.companies),
    );

    let outcome = runner
        .run(&EvaluationJob::document(h.tenant, document))
        .await?;
    assert!(matches!(outcome, JobOutcome::Document(_)));

    let outcome = runner.run(&EvaluationJob::company(h.tenant, company)).await?;
    assert!(matches!(outcome, JobOutcome::Company(_)));

    let malformed = EvaluationJob {
        tenant_id: h.tenant,
        client_company_id: None,
        document_id: None,
    };
    assert!(matches!(
        runner.run(&malformed).await,
        Err(Error::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn duplicate_invoice_rule_fires_within_window() -> anyhow::Result<()> {
    let h = harness();
    let company = ClientCompanyId::generate();
    let document = DocumentId::generate();

    h.rules.put_rules(
        h.tenant,
        vec![RiskRule::new("DUPLICATE_INVOICE", RuleScope::Document, 45.0)],
    );
    h.features.put(h.tenant, doc_features(document, company, &[]));

    let mut mine = invoice(company, Some(document), None, "1500.00", 10);
    mine.counterparty = Some("Acme BV".to_string());
    let mut twin = invoice(company, None, None, "1500.00", 20);
    twin.counterparty = Some("Acme BV".to_string());
    h.ledger.add_invoice(h.tenant, mine);
    h.ledger.add_invoice(h.tenant, twin);

    let result = h.documents.evaluate(h.tenant, document, None).await?;
    assert_eq!(result.triggered_rule_codes, vec!["DUPLICATE_INVOICE"]);
    assert_eq!(result.score.value(), 45);
    Ok(())
}

#[tokio::test]
async fn distant_duplicate_does_not_fire() -> anyhow::Result<()> {
    let h = harness();
    let company = ClientCompanyId::generate();
    let document = DocumentId::generate();

    h.rules.put_rules(
        h.tenant,
        vec![RiskRule::new("DUPLICATE_INVOICE", RuleScope::Document, 45.0)],
    );
    h.features.put(h.tenant, doc_features(document, company, &[]));

    let mut mine = invoice(company, Some(document), None, "1500.00", 10);
    mine.counterparty = Some("Acme BV".to_string());
    let mut far = invoice(company, None, None, "1500.00", 50);
    far.counterparty = Some("Acme BV".to_string());
    h.ledger.add_invoice(h.tenant, mine);
    h.ledger.add_invoice(h.tenant, far);

    let result = h.documents.evaluate(h.tenant, document, None).await?;
    assert!(result.triggered_rule_codes.is_empty());
    assert_eq!(result.score.value(), 0);
    Ok(())
}

#[test]
fn score_decimal_amounts_parse() {
    // Decimal literals used across these tests stay exact
    assert_eq!("1500.00".parse::<Decimal>().unwrap(), Decimal::from(1500));
}
