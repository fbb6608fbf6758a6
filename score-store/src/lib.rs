//! Numera Score Store
//!
//! The produced boundary of the risk engine: the current score per
//! (tenant, entity) with atomic last-write-wins upsert semantics, an
//! append-only score history, and the derived trend view.
//!
//! # Invariants
//!
//! - One current record per (tenant, entity type, entity id)
//! - The current-score write is a single keyed insert, never a
//!   read-modify-write pair
//! - History is insert-only: no update or delete path exists
//! - Trend direction is derived on read, never stored

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod store;
pub mod trend;

pub use store::{CurrentScore, InMemoryScoreStore, ScoreStore};
pub use trend::{direction, TrendDirection};
