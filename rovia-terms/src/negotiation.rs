use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rovia_domain::{
    flip_if_expired, InvitationStatus, ManagementInvitation, ManagerPermissions, NegotiationEntry,
    Party, RevenueSplit,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::actor::{self, ActorIdentity};

/// Hard cap on counter-offer exchanges. Past it, only accept/decline remain.
pub const MAX_NEGOTIATION_ROUNDS: u8 = 5;

const TOKEN_LENGTH: usize = 40;

/// Payload for opening a negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvitation {
    pub sender: Party,
    pub recipient: Party,
    pub vehicle_ids: Vec<Uuid>,
    pub proposed_split: RevenueSplit,
    pub permissions: ManagerPermissions,
    pub note: Option<String>,
}

/// Bounded bilateral counter-offer state machine for management delegation.
///
/// PENDING --counter--> COUNTER_OFFERED --counter--> ... --accept--> ACCEPTED;
/// any non-terminal state declines to DECLINED or lapses to EXPIRED.
pub struct NegotiationEngine {
    invitations: HashMap<Uuid, ManagementInvitation>,
    by_token: HashMap<String, Uuid>,
}

impl NegotiationEngine {
    pub fn new() -> Self {
        Self {
            invitations: HashMap::new(),
            by_token: HashMap::new(),
        }
    }

    /// Open a negotiation. The original proposal is entry zero of the history,
    /// so replaying the log reproduces every offer ever on the table.
    pub fn send(
        &mut self,
        input: NewInvitation,
        valid_for: Duration,
        now: DateTime<Utc>,
    ) -> Result<ManagementInvitation, NegotiationError> {
        if !input.sender.is_addressable() || !input.recipient.is_addressable() {
            return Err(NegotiationError::Validation(
                "both parties need an account id or an email".into(),
            ));
        }
        if input.vehicle_ids.is_empty() {
            return Err(NegotiationError::Validation(
                "an invitation must cover at least one vehicle".into(),
            ));
        }
        if !input.proposed_split.is_balanced() {
            return Err(NegotiationError::Validation(format!(
                "split {}/{} does not sum to 100",
                input.proposed_split.owner_percent, input.proposed_split.manager_percent
            )));
        }

        let invitation = ManagementInvitation {
            id: Uuid::new_v4(),
            token: generate_token(),
            sender: input.sender,
            recipient: input.recipient,
            vehicle_ids: input.vehicle_ids,
            proposed_split: input.proposed_split,
            counter_split: None,
            negotiation_rounds: 0,
            history: vec![NegotiationEntry {
                actor: rovia_domain::PartyRole::Sender,
                owner_percent: input.proposed_split.owner_percent,
                manager_percent: input.proposed_split.manager_percent,
                note: input.note,
                at: now,
            }],
            permissions: input.permissions,
            status: InvitationStatus::Pending,
            decline_reason: None,
            expires_at: now + valid_for,
            responded_at: None,
            created_at: now,
            updated_at: now,
        };

        self.by_token.insert(invitation.token.clone(), invitation.id);
        self.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    /// Fetch by bearer token, applying lazy expiry as a side effect of the read.
    pub fn get(
        &mut self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<&ManagementInvitation, NegotiationError> {
        let invitation = self.lookup_mut(token)?;
        flip_if_expired(invitation, now);
        Ok(invitation)
    }

    /// Counter the offer currently on the table.
    ///
    /// Only the party that did not make the latest offer may counter; a party
    /// never counters its own just-made offer. `expected_round` is an
    /// optimistic guard: a caller acting on stale terms gets `Conflict`
    /// instead of silently overwriting a concurrent counter.
    pub fn counter(
        &mut self,
        token: &str,
        caller: &ActorIdentity,
        split: RevenueSplit,
        note: Option<String>,
        expected_round: Option<u8>,
        now: DateTime<Utc>,
    ) -> Result<ManagementInvitation, NegotiationError> {
        let invitation = self.lookup_mut(token)?;
        if flip_if_expired(invitation, now) || invitation.status == InvitationStatus::Expired {
            return Err(NegotiationError::Expired("invitation has expired".into()));
        }
        if invitation.status.is_terminal() {
            return Err(NegotiationError::Conflict(format!(
                "invitation is settled (status {:?})",
                invitation.status
            )));
        }

        let role = actor::resolve(invitation, caller);
        let party = role
            .party()
            .ok_or_else(|| NegotiationError::Forbidden("caller is not a party to this invitation".into()))?;
        if party == invitation.last_offer_by() {
            return Err(NegotiationError::Forbidden(
                "cannot counter your own offer".into(),
            ));
        }

        if invitation.negotiation_rounds >= MAX_NEGOTIATION_ROUNDS {
            return Err(NegotiationError::RoundsExhausted(format!(
                "negotiation is capped at {} rounds",
                MAX_NEGOTIATION_ROUNDS
            )));
        }
        if let Some(expected) = expected_round {
            if expected != invitation.negotiation_rounds {
                return Err(NegotiationError::Conflict(format!(
                    "negotiation moved on (round {}, expected {})",
                    invitation.negotiation_rounds, expected
                )));
            }
        }
        if !split.is_balanced() {
            return Err(NegotiationError::Validation(format!(
                "split {}/{} does not sum to 100",
                split.owner_percent, split.manager_percent
            )));
        }

        invitation.history.push(NegotiationEntry {
            actor: party,
            owner_percent: split.owner_percent,
            manager_percent: split.manager_percent,
            note,
            at: now,
        });
        invitation.counter_split = Some(split);
        invitation.negotiation_rounds += 1;
        invitation.status = InvitationStatus::CounterOffered;
        invitation.touch();
        Ok(invitation.clone())
    }

    /// Accept the terms currently on the table. Available only to the party
    /// that did not make the latest offer. Terminal.
    pub fn accept(
        &mut self,
        token: &str,
        caller: &ActorIdentity,
        now: DateTime<Utc>,
    ) -> Result<ManagementInvitation, NegotiationError> {
        let invitation = self.lookup_mut(token)?;
        if flip_if_expired(invitation, now) || invitation.status == InvitationStatus::Expired {
            return Err(NegotiationError::Expired("invitation has expired".into()));
        }
        if invitation.status.is_terminal() {
            return Err(NegotiationError::Conflict(format!(
                "invitation is settled (status {:?})",
                invitation.status
            )));
        }

        let role = actor::resolve(invitation, caller);
        let party = role
            .party()
            .ok_or_else(|| NegotiationError::Forbidden("caller is not a party to this invitation".into()))?;
        if party == invitation.last_offer_by() {
            return Err(NegotiationError::Forbidden(
                "the party that made the latest offer cannot accept it".into(),
            ));
        }

        invitation.status = InvitationStatus::Accepted;
        invitation.responded_at = Some(now);
        invitation.touch();
        Ok(invitation.clone())
    }

    /// Decline the negotiation. Available to either party; terminal and
    /// mutually exclusive with acceptance.
    pub fn decline(
        &mut self,
        token: &str,
        caller: &ActorIdentity,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ManagementInvitation, NegotiationError> {
        let invitation = self.lookup_mut(token)?;
        if flip_if_expired(invitation, now) || invitation.status == InvitationStatus::Expired {
            return Err(NegotiationError::Expired("invitation has expired".into()));
        }
        if invitation.status.is_terminal() {
            return Err(NegotiationError::Conflict(format!(
                "invitation is settled (status {:?})",
                invitation.status
            )));
        }

        if actor::resolve(invitation, caller).party().is_none() {
            return Err(NegotiationError::Forbidden(
                "caller is not a party to this invitation".into(),
            ));
        }

        invitation.status = InvitationStatus::Declined;
        invitation.decline_reason = reason;
        invitation.responded_at = Some(now);
        invitation.touch();
        Ok(invitation.clone())
    }

    /// Proactive expiry pass for list views; freshness only.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let mut flipped = 0;
        for invitation in self.invitations.values_mut() {
            if flip_if_expired(invitation, now) {
                flipped += 1;
            }
        }
        flipped
    }

    fn lookup_mut(&mut self, token: &str) -> Result<&mut ManagementInvitation, NegotiationError> {
        let id = self
            .by_token
            .get(token)
            .ok_or_else(|| NegotiationError::NotFound("unknown invitation token".into()))?;
        self.invitations
            .get_mut(id)
            .ok_or_else(|| NegotiationError::NotFound("unknown invitation token".into()))
    }
}

impl Default for NegotiationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque, unguessable bearer token. Single purpose; never a JWT.
fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rounds exhausted: {0}")]
    RoundsExhausted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(owner: u8, manager: u8) -> RevenueSplit {
        RevenueSplit { owner_percent: owner, manager_percent: manager }
    }

    fn parties() -> (Party, ActorIdentity, Party, ActorIdentity) {
        let sender_id = Uuid::new_v4();
        let sender = Party { account_id: Some(sender_id), email: Some("owner@example.com".into()) };
        let sender_actor = ActorIdentity { account_id: Some(sender_id), email: None };
        let recipient = Party { account_id: None, email: Some("manager@example.com".into()) };
        let recipient_actor =
            ActorIdentity { account_id: None, email: Some("MANAGER@example.com".into()) };
        (sender, sender_actor, recipient, recipient_actor)
    }

    fn open(engine: &mut NegotiationEngine, now: DateTime<Utc>) -> (String, ActorIdentity, ActorIdentity) {
        let (sender, sender_actor, recipient, recipient_actor) = parties();
        let invitation = engine
            .send(
                NewInvitation {
                    sender,
                    recipient,
                    vehicle_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
                    proposed_split: split(70, 30),
                    permissions: ManagerPermissions {
                        edit_listing: true,
                        adjust_pricing: false,
                        message_guests: true,
                        approve_bookings: true,
                        handle_issues: true,
                    },
                    note: Some("two sedans downtown".into()),
                },
                Duration::days(7),
                now,
            )
            .unwrap();
        (invitation.token, sender_actor, recipient_actor)
    }

    #[test]
    fn test_counter_counter_accept_flow() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, sender, recipient) = open(&mut engine, now);

        // Recipient counters the opening 70/30
        let inv = engine
            .counter(&token, &recipient, split(60, 40), None, Some(0), now)
            .unwrap();
        assert_eq!(inv.status, InvitationStatus::CounterOffered);
        assert_eq!(inv.negotiation_rounds, 1);

        // Sender counters back
        let inv = engine
            .counter(&token, &sender, split(65, 35), Some("meet in the middle".into()), Some(1), now)
            .unwrap();
        assert_eq!(inv.negotiation_rounds, 2);

        // Recipient accepts the terms on the table
        let inv = engine.accept(&token, &recipient, now).unwrap();
        assert_eq!(inv.status, InvitationStatus::Accepted);
        assert_eq!(inv.current_terms(), split(65, 35));
        // Original proposal plus two counters
        assert_eq!(inv.history.len(), 3);
    }

    #[test]
    fn test_cannot_counter_own_offer() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, sender, recipient) = open(&mut engine, now);

        // The sender's proposal is the latest offer; the sender cannot counter it
        let result = engine.counter(&token, &sender, split(80, 20), None, None, now);
        assert!(matches!(result, Err(NegotiationError::Forbidden(_))));

        engine.counter(&token, &recipient, split(60, 40), None, None, now).unwrap();
        let result = engine.counter(&token, &recipient, split(55, 45), None, None, now);
        assert!(matches!(result, Err(NegotiationError::Forbidden(_))));
    }

    #[test]
    fn test_round_cap_leaves_accept_and_decline() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, sender, recipient) = open(&mut engine, now);

        for round in 0..MAX_NEGOTIATION_ROUNDS {
            let (caller, owner) = if round % 2 == 0 { (&recipient, 60) } else { (&sender, 65) };
            engine
                .counter(&token, caller, split(owner, 100 - owner), None, None, now)
                .unwrap();
        }

        let exhausted = engine.counter(&token, &sender, split(50, 50), None, None, now);
        assert!(matches!(exhausted, Err(NegotiationError::RoundsExhausted(_))));

        // The fifth counter came from the recipient, so the sender may still accept
        let inv = engine.accept(&token, &sender, now).unwrap();
        assert_eq!(inv.status, InvitationStatus::Accepted);
        assert_eq!(inv.negotiation_rounds, MAX_NEGOTIATION_ROUNDS);
    }

    #[test]
    fn test_stale_round_guard() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, _sender, recipient) = open(&mut engine, now);

        engine.counter(&token, &recipient, split(60, 40), None, Some(0), now).unwrap();

        // A second counter built against round 0 lost the race
        let stale = engine.counter(&token, &recipient, split(55, 45), None, Some(0), now);
        assert!(matches!(stale, Err(NegotiationError::Conflict(_))));
    }

    #[test]
    fn test_expiry_flips_on_read() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, _sender, recipient) = open(&mut engine, now);

        let later = now + Duration::days(8);
        let inv = engine.get(&token, later).unwrap();
        assert_eq!(inv.status, InvitationStatus::Expired);

        let result = engine.accept(&token, &recipient, later);
        assert!(matches!(result, Err(NegotiationError::Expired(_))));
    }

    #[test]
    fn test_decline_is_terminal() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, sender, recipient) = open(&mut engine, now);

        let inv = engine
            .decline(&token, &sender, Some("changed my mind".into()), now)
            .unwrap();
        assert_eq!(inv.status, InvitationStatus::Declined);
        assert_eq!(inv.decline_reason.as_deref(), Some("changed my mind"));

        let result = engine.accept(&token, &recipient, now);
        assert!(matches!(result, Err(NegotiationError::Conflict(_))));
    }

    #[test]
    fn test_stranger_is_forbidden() {
        let mut engine = NegotiationEngine::new();
        let now = Utc::now();
        let (token, _sender, _recipient) = open(&mut engine, now);

        let stranger = ActorIdentity { account_id: Some(Uuid::new_v4()), email: None };
        let result = engine.counter(&token, &stranger, split(50, 50), None, None, now);
        assert!(matches!(result, Err(NegotiationError::Forbidden(_))));
    }

    #[test]
    fn test_unbalanced_proposal_rejected() {
        let mut engine = NegotiationEngine::new();
        let (sender, _, recipient, _) = parties();

        let result = engine.send(
            NewInvitation {
                sender,
                recipient,
                vehicle_ids: vec![Uuid::new_v4()],
                proposed_split: split(70, 40),
                permissions: ManagerPermissions::default(),
                note: None,
            },
            Duration::days(7),
            Utc::now(),
        );
        assert!(matches!(result, Err(NegotiationError::Validation(_))));
    }
}
