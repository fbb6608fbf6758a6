//! Numera Tenant Data
//!
//! Boundary traits for the collaborators the risk engine consumes: the rule
//! catalog, the document feature store and the ledger. Every lookup is keyed
//! by tenant first; a probe for another tenant's entity fails closed as
//! NotFound and never reveals whether the entity exists elsewhere.
//!
//! The in-memory implementations back tests and embedding callers.

#![forbid(unsafe_code)]

pub mod features;
pub mod ledger;
pub mod rules;

pub use features::{FeatureStore, InMemoryFeatureStore};
pub use ledger::{InMemoryLedgerStore, LedgerStore};
pub use rules::{InMemoryRuleStore, RuleStore};
