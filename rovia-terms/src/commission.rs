use chrono::{DateTime, Utc};
use rovia_domain::CommissionAuditEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a host monetizes through the platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MonetizationPath {
    Insurance,
    Tiers,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommissionTier {
    P2p,
    Commercial,
    SelfManage,
}

/// Commission rate and its complement, the host payout share.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CommissionTerms {
    pub rate: f64,
    pub payout_percentage: f64,
}

/// Map a declared monetization path/tier to commission terms.
///
/// Pure: no persistence, no clock. Recording the change in the audit ledger
/// is a separate, explicit step so this stays unit-testable on its own and
/// the mapping remains reproducible for audit.
pub fn resolve(
    path: MonetizationPath,
    tier: Option<CommissionTier>,
) -> Result<CommissionTerms, TermsError> {
    let rate = match (path, tier) {
        (MonetizationPath::Insurance, None) => 0.60,
        (MonetizationPath::Insurance, Some(_)) => {
            return Err(TermsError::Validation(
                "the insurance path does not take a tier".into(),
            ))
        }
        (MonetizationPath::Tiers, Some(CommissionTier::P2p)) => 0.25,
        (MonetizationPath::Tiers, Some(CommissionTier::Commercial)) => 0.10,
        (MonetizationPath::Tiers, Some(CommissionTier::SelfManage)) => 0.25,
        (MonetizationPath::Tiers, None) => {
            return Err(TermsError::Validation("the tiers path requires a tier".into()))
        }
    };

    Ok(CommissionTerms {
        rate,
        payout_percentage: 1.0 - rate,
    })
}

/// Default commission computed once at host approval from fleet size.
/// Never retroactively overrides a later explicit path/tier selection.
pub fn initial_rate_for_fleet(fleet_size: usize) -> f64 {
    if fleet_size >= 100 {
        0.10
    } else if fleet_size >= 50 {
        0.15
    } else if fleet_size >= 10 {
        0.20
    } else {
        0.25
    }
}

/// Append-only ledger of commission changes.
pub struct CommissionLedger {
    entries: Vec<CommissionAuditEntry>,
}

impl CommissionLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a rate change. Entries are immutable once written.
    pub fn record(
        &mut self,
        host_id: Uuid,
        old_rate: f64,
        new_rate: f64,
        reason: String,
        actor: String,
        now: DateTime<Utc>,
    ) -> CommissionAuditEntry {
        let entry = CommissionAuditEntry::new(host_id, old_rate, new_rate, reason, actor, now);
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries_for(&self, host_id: &Uuid) -> Vec<&CommissionAuditEntry> {
        self.entries.iter().filter(|e| e.host_id == *host_id).collect()
    }

    /// The rate currently in force for a host, if any change was ever recorded.
    pub fn current_rate(&self, host_id: &Uuid) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.host_id == *host_id)
            .map(|e| e.new_rate)
    }
}

impl Default for CommissionLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TermsError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_table() {
        let insurance = resolve(MonetizationPath::Insurance, None).unwrap();
        assert_eq!(insurance.rate, 0.60);
        assert_eq!(insurance.payout_percentage, 0.40);

        let p2p = resolve(MonetizationPath::Tiers, Some(CommissionTier::P2p)).unwrap();
        assert_eq!(p2p.rate, 0.25);

        let commercial = resolve(MonetizationPath::Tiers, Some(CommissionTier::Commercial)).unwrap();
        assert_eq!(commercial.rate, 0.10);
        assert_eq!(commercial.payout_percentage, 0.90);

        let self_manage = resolve(MonetizationPath::Tiers, Some(CommissionTier::SelfManage)).unwrap();
        assert_eq!(self_manage.rate, 0.25);
    }

    #[test]
    fn test_invalid_combinations() {
        assert!(matches!(
            resolve(MonetizationPath::Insurance, Some(CommissionTier::P2p)),
            Err(TermsError::Validation(_))
        ));
        assert!(matches!(
            resolve(MonetizationPath::Tiers, None),
            Err(TermsError::Validation(_))
        ));
    }

    #[test]
    fn test_fleet_size_thresholds() {
        assert_eq!(initial_rate_for_fleet(0), 0.25);
        assert_eq!(initial_rate_for_fleet(9), 0.25);
        assert_eq!(initial_rate_for_fleet(10), 0.20);
        assert_eq!(initial_rate_for_fleet(49), 0.20);
        assert_eq!(initial_rate_for_fleet(50), 0.15);
        assert_eq!(initial_rate_for_fleet(99), 0.15);
        assert_eq!(initial_rate_for_fleet(100), 0.10);
    }

    #[test]
    fn test_ledger_is_append_only_per_host() {
        let mut ledger = CommissionLedger::new();
        let host_id = Uuid::new_v4();
        let now = Utc::now();

        ledger.record(host_id, 0.25, 0.10, "switched to commercial".into(), "host".into(), now);
        ledger.record(host_id, 0.10, 0.60, "switched to insurance".into(), "admin".into(), now);
        ledger.record(Uuid::new_v4(), 0.25, 0.20, "fleet grew".into(), "system".into(), now);

        assert_eq!(ledger.entries_for(&host_id).len(), 2);
        assert_eq!(ledger.current_rate(&host_id), Some(0.60));
    }
}
