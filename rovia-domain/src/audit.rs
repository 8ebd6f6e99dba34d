use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row in the commission audit ledger. Written once, never updated or
/// deleted; the ledger is the reproducibility record for every rate change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionAuditEntry {
    pub id: Uuid,
    pub host_id: Uuid,
    pub old_rate: f64,
    pub new_rate: f64,
    pub reason: String,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}

impl CommissionAuditEntry {
    pub fn new(
        host_id: Uuid,
        old_rate: f64,
        new_rate: f64,
        reason: String,
        actor: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id,
            old_rate,
            new_rate,
            reason,
            actor,
            recorded_at: now,
        }
    }
}
