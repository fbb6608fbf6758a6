//! Core types for the risk rule engine

use crate::severity::Severity;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing id
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random id
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id! {
    /// Tenant identifier
    TenantId
}

uuid_id! {
    /// Document identifier
    DocumentId
}

uuid_id! {
    /// Client company identifier
    ClientCompanyId
}

uuid_id! {
    /// Invoice identifier
    InvoiceId
}

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score, clamped to 0-100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Build a score from a rule-weight sum: clamp to [0, 100], round half-up
    pub fn from_weight_sum(sum: f64) -> Self {
        let clamped = sum.clamp(0.0, 100.0);
        Self(clamped.round() as u8)
    }

    /// Get raw score
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which aggregate a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    /// A single document
    Document,
    /// An aggregated client company
    Company,
}

/// Kind of scored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    /// A document score
    Document,
    /// A client-company score
    ClientCompany,
}

impl EntityType {
    /// Stable string form used in logs and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Document => "document",
            EntityType::ClientCompany => "clientCompany",
        }
    }
}

/// A named, weighted, tenant-scoped predicate over document or company data.
/// Immutable during one evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRule {
    /// Rule code, dispatched through the predicate registry
    pub code: String,

    /// Whether the rule applies to documents or companies
    pub scope: RuleScope,

    /// Weight added to the score when the predicate holds
    pub weight: f64,

    /// Severity suggested by the catalog author
    pub default_severity: Severity,

    /// Inactive rules are never evaluated
    pub active: bool,

    /// Rule-specific tuning (thresholds, ratios, window days)
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

impl RiskRule {
    /// Convenience constructor for an active rule without config
    pub fn new(code: impl Into<String>, scope: RuleScope, weight: f64) -> Self {
        Self {
            code: code.into(),
            scope,
            weight,
            default_severity: Severity::Medium,
            active: true,
            config: HashMap::new(),
        }
    }

    /// Attach a config entry
    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// A feature value extracted upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Boolean flag
    Bool(bool),
    /// Numeric measurement
    Number(f64),
}

/// A raw risk flag attached to a document upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    /// Flag code, matched against unrecognized rule codes
    pub code: String,
}

/// Feature data for one document, produced by the upstream extraction step.
/// The engine consumes this record; it never computes it (fraud signals aside).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRiskFeatures {
    /// Document the features describe
    pub document_id: DocumentId,

    /// Company the document belongs to
    pub client_company_id: ClientCompanyId,

    /// Extracted feature flags and measurements
    pub features: HashMap<String, FeatureValue>,

    /// Raw risk flags from upstream heuristics
    pub risk_flags: Vec<RiskFlag>,

    /// Upstream preliminary score, if any
    pub risk_score: Option<u8>,
}

/// Current risk score for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRiskScore {
    /// Scored document
    pub document_id: DocumentId,

    /// Clamped score
    pub score: RiskScore,

    /// Severity derived from the score
    pub severity: Severity,

    /// Codes whose predicate evaluated true in this run, sorted
    pub triggered_rule_codes: Vec<String>,

    /// When this evaluation ran
    pub generated_at: DateTime<Utc>,
}

/// Current risk score for one client company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCompanyRiskScore {
    /// Scored company
    pub client_company_id: ClientCompanyId,

    /// Clamped score
    pub score: RiskScore,

    /// Severity derived from the score
    pub severity: Severity,

    /// Codes whose predicate evaluated true in this run, sorted
    pub triggered_rule_codes: Vec<String>,

    /// When this evaluation ran
    pub generated_at: DateTime<Utc>,
}

/// One immutable point on an entity's score timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoreHistoryEntry {
    /// Owning tenant
    pub tenant_id: TenantId,

    /// Kind of scored entity
    pub entity_type: EntityType,

    /// Scored entity id
    pub entity_id: Uuid,

    /// Score at the moment of evaluation
    pub score: RiskScore,

    /// Severity derived from the score at that moment
    pub severity: Severity,

    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}

/// An invoice row from the ledger boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice id
    pub id: InvoiceId,

    /// Company the invoice belongs to
    pub client_company_id: ClientCompanyId,

    /// Document the invoice was extracted from, if linked
    pub document_id: Option<DocumentId>,

    /// Counterparty-assigned invoice number
    pub external_number: Option<String>,

    /// Counterparty name
    pub counterparty: Option<String>,

    /// Gross amount
    pub amount: Decimal,

    /// Issue date
    pub issued_on: NaiveDate,

    /// Due date, if stated
    pub due_on: Option<NaiveDate>,
}

/// A booked transaction from the ledger boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id
    pub id: Uuid,

    /// Company the transaction belongs to
    pub client_company_id: ClientCompanyId,

    /// Counterparty name, if known
    pub counterparty: Option<String>,

    /// Signed amount; negative is outgoing
    pub amount: Decimal,

    /// VAT rate applied, if any
    pub vat_rate: Option<Decimal>,

    /// Booking date
    pub booked_at: DateTime<Utc>,

    /// When the entry was recorded, if tracked
    pub entered_at: Option<DateTime<Utc>>,
}
