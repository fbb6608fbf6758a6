//! Current-score upsert and append-only history

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use risk_core::{EntityType, Result, RiskScore, RiskScoreHistoryEntry, Severity, TenantId};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// The current score of one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentScore {
    /// Clamped score
    pub score: RiskScore,

    /// Severity derived from the score
    pub severity: Severity,

    /// Codes whose predicate evaluated true in the producing run, sorted
    pub triggered_rule_codes: Vec<String>,

    /// When the producing evaluation ran
    pub generated_at: DateTime<Utc>,
}

/// Write and read side of the score boundary
pub trait ScoreStore: Send + Sync {
    /// Atomically replace the current score of one entity. Last writer wins;
    /// there is no read-modify-write step to race against.
    fn upsert_current(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        record: CurrentScore,
    ) -> Result<()>;

    /// The current score of one entity, if it was ever evaluated
    fn current(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Option<CurrentScore>>;

    /// Append one history entry. The history exposes no update or delete.
    fn append_history(&self, entry: RiskScoreHistoryEntry) -> Result<()>;

    /// The history of one entity ordered by creation time
    fn history(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<RiskScoreHistoryEntry>>;
}

/// In-memory score store
#[derive(Default)]
pub struct InMemoryScoreStore {
    current: DashMap<(TenantId, EntityType, Uuid), CurrentScore>,
    history: RwLock<Vec<RiskScoreHistoryEntry>>,
}

impl InMemoryScoreStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn upsert_current(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        record: CurrentScore,
    ) -> Result<()> {
        self.current
            .insert((tenant_id, entity_type, entity_id), record);
        Ok(())
    }

    fn current(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Option<CurrentScore>> {
        let record = self
            .current
            .get(&(tenant_id, entity_type, entity_id))
            .map(|entry| entry.value().clone());

        // Score-derived severity is the source of truth; a stored mismatch
        // is a data-quality signal, not behavior to honor.
        Ok(record.map(|mut record| {
            let derived = Severity::of(record.score);
            if record.severity != derived {
                warn!(
                    entity_type = entity_type.as_str(),
                    %entity_id,
                    score = record.score.value(),
                    stored = record.severity.as_str(),
                    derived = derived.as_str(),
                    "stored severity disagrees with its score"
                );
                record.severity = derived;
            }
            record
        }))
    }

    fn append_history(&self, entry: RiskScoreHistoryEntry) -> Result<()> {
        self.history.write().push(entry);
        Ok(())
    }

    fn history(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> Result<Vec<RiskScoreHistoryEntry>> {
        let mut entries: Vec<RiskScoreHistoryEntry> = self
            .history
            .read()
            .iter()
            .filter(|entry| {
                entry.tenant_id == tenant_id
                    && entry.entity_type == entity_type
                    && entry.entity_id == entity_id
            })
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }
}
