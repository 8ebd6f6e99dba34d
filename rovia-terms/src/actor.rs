use rovia_domain::{ManagementInvitation, Party, PartyRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a caller stands relative to an invitation's two parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Sender,
    Recipient,
    Neither,
}

impl ActorRole {
    pub fn party(self) -> Option<PartyRole> {
        match self {
            ActorRole::Sender => Some(PartyRole::Sender),
            ActorRole::Recipient => Some(PartyRole::Recipient),
            ActorRole::Neither => None,
        }
    }
}

/// Caller identity as resolved by the (external) session layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub account_id: Option<Uuid>,
    pub email: Option<String>,
}

/// The single capability check every invitation action goes through.
/// Account id wins over email; email comparison is case-insensitive.
pub fn resolve(invitation: &ManagementInvitation, actor: &ActorIdentity) -> ActorRole {
    if matches_party(&invitation.sender, actor) {
        ActorRole::Sender
    } else if matches_party(&invitation.recipient, actor) {
        ActorRole::Recipient
    } else {
        ActorRole::Neither
    }
}

fn matches_party(party: &Party, actor: &ActorIdentity) -> bool {
    if let (Some(a), Some(b)) = (party.account_id, actor.account_id) {
        if a == b {
            return true;
        }
    }
    if let (Some(a), Some(b)) = (party.email.as_deref(), actor.email.as_deref()) {
        if a.eq_ignore_ascii_case(b) {
            return true;
        }
    }
    false
}
