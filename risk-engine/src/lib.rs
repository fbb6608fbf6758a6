//! Numera Risk Engine
//!
//! Tenant-scoped evaluation of documents and client companies against a
//! catalog of weighted rules, enriched with statistical fraud signals.
//!
//! Each evaluation is a pure transform from (rules, features, fraud signals)
//! to (score, severity, triggered codes) with exactly one side-effecting
//! current-score upsert and one history append. Evaluations of different
//! entities are fully independent; re-running an unchanged entity yields an
//! identical result.

#![forbid(unsafe_code)]

pub mod alerts;
pub mod catalog;
pub mod company;
pub mod config;
pub mod context;
pub mod document;
pub mod metrics;
pub mod registry;
mod signals;
pub mod worker;

pub use alerts::{AlertDispatcher, AlertRequest, LogAlertDispatcher, RecordingAlertDispatcher};
pub use catalog::RuleCatalog;
pub use company::ClientCompanyRiskEvaluator;
pub use config::EngineConfig;
pub use document::DocumentRiskEvaluator;
pub use metrics::Metrics;
pub use registry::{CompanyRuleRegistry, DocumentRuleRegistry};
pub use risk_core::{Error, Result};
pub use worker::{JobOutcome, JobRunner};
