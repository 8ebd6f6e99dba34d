use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::LazyExpire;

/// Which side of the negotiation a recorded action belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyRole {
    Sender,
    Recipient,
}

/// One side of the negotiation, addressed by account id and/or email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub account_id: Option<Uuid>,
    pub email: Option<String>,
}

impl Party {
    pub fn is_addressable(&self) -> bool {
        self.account_id.is_some() || self.email.is_some()
    }
}

/// Owner/manager revenue split, in whole percent. Must sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevenueSplit {
    pub owner_percent: u8,
    pub manager_percent: u8,
}

impl RevenueSplit {
    pub fn is_balanced(&self) -> bool {
        self.owner_percent as u16 + self.manager_percent as u16 == 100
    }
}

/// One append-only row in the negotiation log. Replay of the history
/// reproduces every offer that was ever on the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationEntry {
    pub actor: PartyRole,
    pub owner_percent: u8,
    pub manager_percent: u8,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

/// What the delegated manager is allowed to do once the invitation is accepted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ManagerPermissions {
    pub edit_listing: bool,
    pub adjust_pricing: bool,
    pub message_guests: bool,
    pub approve_bookings: bool,
    pub handle_issues: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    CounterOffered,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    /// Accepted, declined and expired invitations are immutable.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvitationStatus::Accepted | InvitationStatus::Declined | InvitationStatus::Expired
        )
    }
}

/// A bilateral management-delegation negotiation between two hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementInvitation {
    pub id: Uuid,
    pub token: String,
    pub sender: Party,
    pub recipient: Party,
    pub vehicle_ids: Vec<Uuid>,
    pub proposed_split: RevenueSplit,
    pub counter_split: Option<RevenueSplit>,
    pub negotiation_rounds: u8,
    pub history: Vec<NegotiationEntry>,
    pub permissions: ManagerPermissions,
    pub status: InvitationStatus,
    pub decline_reason: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManagementInvitation {
    /// The split currently on the table: the latest counter, else the original proposal.
    pub fn current_terms(&self) -> RevenueSplit {
        self.counter_split.unwrap_or(self.proposed_split)
    }

    /// Which party made the offer currently on the table.
    pub fn last_offer_by(&self) -> PartyRole {
        self.history
            .last()
            .map(|entry| entry.actor)
            .unwrap_or(PartyRole::Sender)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl LazyExpire for ManagementInvitation {
    fn deadline(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn expirable(&self) -> bool {
        matches!(
            self.status,
            InvitationStatus::Pending | InvitationStatus::CounterOffered
        )
    }

    fn expire(&mut self) {
        self.status = InvitationStatus::Expired;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_balance() {
        assert!(RevenueSplit { owner_percent: 70, manager_percent: 30 }.is_balanced());
        assert!(!RevenueSplit { owner_percent: 70, manager_percent: 40 }.is_balanced());
        assert!(RevenueSplit { owner_percent: 0, manager_percent: 100 }.is_balanced());
    }
}
