use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use crate::board::MatchError;
use rovia_domain::{ReassignmentToken, ReviewOutcome};
use rovia_fleet::{BookingLedger, FleetRegistry};
use std::collections::HashMap;
use uuid::Uuid;

/// Reassignment tokens are valid for a fixed window from issuance.
pub const TOKEN_VALIDITY_HOURS: i64 = 48;

const TOKEN_LENGTH: usize = 32;

/// Compensating flow for host-rejected bookings: swaps in a replacement
/// vehicle behind a single-use guest-consent token and puts the booking back
/// in front of the replacement vehicle's owner for review.
pub struct ReassignmentCoordinator {
    tokens: HashMap<String, ReassignmentToken>,
}

impl ReassignmentCoordinator {
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    /// Start a reassignment on a booking whose host review came back REJECTED.
    ///
    /// Resets the host-review fields so the replacement vehicle's owner
    /// re-enters the review queue as if freshly assigned. The returned token
    /// goes to the guest for consent; delivering it is the notification
    /// boundary's problem and never rolls this transition back.
    pub fn initiate(
        &mut self,
        ledger: &mut BookingLedger,
        fleet: &FleetRegistry,
        booking_id: Uuid,
        replacement_vehicle_id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<ReassignmentToken, MatchError> {
        let replacement = fleet
            .get(&replacement_vehicle_id)
            .ok_or_else(|| MatchError::NotFound(format!("vehicle {}", replacement_vehicle_id)))?;
        if !replacement.is_active {
            return Err(MatchError::Validation(format!(
                "vehicle {} is not an active listing",
                replacement_vehicle_id
            )));
        }

        let booking = ledger
            .get_mut(&booking_id)
            .ok_or_else(|| MatchError::NotFound(format!("booking {}", booking_id)))?;

        if booking.host_review.outcome != Some(ReviewOutcome::Rejected) {
            return Err(MatchError::Conflict(format!(
                "booking {} has no rejected host review",
                booking_id
            )));
        }
        if booking.vehicle_id == replacement_vehicle_id {
            return Err(MatchError::Validation(
                "replacement matches the current vehicle".into(),
            ));
        }
        // One pending consent per booking; a lapsed token must be re-initiated explicitly.
        if self
            .tokens
            .values()
            .any(|t| t.booking_id == booking_id && !t.consumed && !t.is_expired(now))
        {
            return Err(MatchError::Conflict(format!(
                "booking {} already has a pending reassignment",
                booking_id
            )));
        }

        let token = ReassignmentToken {
            token: generate_token(),
            booking_id,
            original_vehicle_id: booking.vehicle_id,
            replacement_vehicle_id,
            reason: reason.clone(),
            issued_at: now,
            expires_at: now + Duration::hours(TOKEN_VALIDITY_HOURS),
            consumed: false,
            consumed_at: None,
        };

        booking.original_vehicle_id = Some(booking.vehicle_id);
        booking.vehicle_change_reason = Some(reason);
        booking.host_review.reset();
        booking.touch();

        self.tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    /// Guest consents to the substitution. First call moves the booking's
    /// vehicle pointer and burns the token; any later call with the same
    /// token is an error, never a repeated effect.
    pub fn consume(
        &mut self,
        ledger: &mut BookingLedger,
        fleet: &FleetRegistry,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, MatchError> {
        let record = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| MatchError::NotFound("unknown reassignment token".into()))?;

        if record.consumed {
            return Err(MatchError::Expired("token already consumed".into()));
        }
        if record.is_expired(now) {
            return Err(MatchError::Expired("token validity window has passed".into()));
        }

        let replacement = fleet
            .get(&record.replacement_vehicle_id)
            .ok_or_else(|| MatchError::NotFound(format!("vehicle {}", record.replacement_vehicle_id)))?;
        let booking = ledger
            .get_mut(&record.booking_id)
            .ok_or_else(|| MatchError::NotFound(format!("booking {}", record.booking_id)))?;

        booking.vehicle_id = record.replacement_vehicle_id;
        booking.host_id = replacement.host_id;
        booking.touch();
        record.consume(now);

        Ok(record.booking_id)
    }

    pub fn token(&self, token: &str) -> Option<&ReassignmentToken> {
        self.tokens.get(token)
    }
}

impl Default for ReassignmentCoordinator {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rovia_domain::{Booking, BookingStatus, DateRange, HostReview, Vehicle};

    fn seeded(ledger: &mut BookingLedger, fleet: &mut FleetRegistry) -> (Uuid, Uuid, Uuid) {
        let host_a = Uuid::new_v4();
        let host_b = Uuid::new_v4();
        let original = fleet.register(Vehicle::new(host_a, "Toyota".into(), "Camry".into(), 2021, 5000));
        let replacement = fleet.register(Vehicle::new(host_b, "Honda".into(), "Accord".into(), 2022, 5200));

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            request_id: None,
            claim_id: None,
            vehicle_id: original,
            host_id: host_a,
            guest_name: "Dana Guest".into(),
            guest_email: "dana@example.com".to_string().into(),
            dates: DateRange::new(
                NaiveDate::from_ymd_opt(2099, 10, 1).unwrap(),
                NaiveDate::from_ymd_opt(2099, 10, 4).unwrap(),
            ),
            daily_rate_cents: 5000,
            status: BookingStatus::Confirmed,
            host_review: HostReview {
                reviewed_by: Some(host_a),
                reviewed_at: Some(now),
                notes: Some("can't honor these dates".into()),
                outcome: Some(ReviewOutcome::Rejected),
            },
            original_vehicle_id: None,
            vehicle_change_reason: None,
            created_at: now,
            updated_at: now,
        };
        let booking_id = ledger.insert(booking);
        (booking_id, original, replacement)
    }

    #[test]
    fn test_initiate_resets_review_and_keeps_vehicle() {
        let mut ledger = BookingLedger::new();
        let mut fleet = FleetRegistry::new();
        let mut coordinator = ReassignmentCoordinator::new();
        let now = Utc::now();

        let (booking_id, original, replacement) = seeded(&mut ledger, &mut fleet);

        let token = coordinator
            .initiate(&mut ledger, &fleet, booking_id, replacement, "host rejected".into(), now)
            .unwrap();

        assert_eq!(token.original_vehicle_id, original);
        assert_eq!(token.expires_at, now + Duration::hours(48));
        assert_eq!(token.token.len(), TOKEN_LENGTH);

        let booking = ledger.get(&booking_id).unwrap();
        // Vehicle pointer moves only on guest consent
        assert_eq!(booking.vehicle_id, original);
        assert_eq!(booking.original_vehicle_id, Some(original));
        assert!(booking.host_review.outcome.is_none());
        assert!(booking.host_review.reviewed_by.is_none());
    }

    #[test]
    fn test_initiate_requires_rejected_review() {
        let mut ledger = BookingLedger::new();
        let mut fleet = FleetRegistry::new();
        let mut coordinator = ReassignmentCoordinator::new();
        let now = Utc::now();

        let (booking_id, _, replacement) = seeded(&mut ledger, &mut fleet);
        ledger.get_mut(&booking_id).unwrap().host_review.reset();

        let result =
            coordinator.initiate(&mut ledger, &fleet, booking_id, replacement, "swap".into(), now);
        assert!(matches!(result, Err(MatchError::Conflict(_))));
    }

    #[test]
    fn test_token_is_single_use() {
        let mut ledger = BookingLedger::new();
        let mut fleet = FleetRegistry::new();
        let mut coordinator = ReassignmentCoordinator::new();
        let now = Utc::now();

        let (booking_id, _, replacement) = seeded(&mut ledger, &mut fleet);
        let token = coordinator
            .initiate(&mut ledger, &fleet, booking_id, replacement, "swap".into(), now)
            .unwrap();

        let first = coordinator.consume(&mut ledger, &fleet, &token.token, now);
        assert_eq!(first.unwrap(), booking_id);
        assert_eq!(ledger.get(&booking_id).unwrap().vehicle_id, replacement);
        assert!(coordinator.token(&token.token).unwrap().consumed);

        // Second consumption fails and repeats nothing
        let second = coordinator.consume(&mut ledger, &fleet, &token.token, now);
        assert!(matches!(second, Err(MatchError::Expired(_))));
    }

    #[test]
    fn test_lapsed_token_rejected() {
        let mut ledger = BookingLedger::new();
        let mut fleet = FleetRegistry::new();
        let mut coordinator = ReassignmentCoordinator::new();
        let now = Utc::now();

        let (booking_id, original, replacement) = seeded(&mut ledger, &mut fleet);
        let token = coordinator
            .initiate(&mut ledger, &fleet, booking_id, replacement, "swap".into(), now)
            .unwrap();

        let late = now + Duration::hours(49);
        let result = coordinator.consume(&mut ledger, &fleet, &token.token, late);
        assert!(matches!(result, Err(MatchError::Expired(_))));
        assert_eq!(ledger.get(&booking_id).unwrap().vehicle_id, original);
    }

    #[test]
    fn test_duplicate_pending_reassignment_conflicts() {
        let mut ledger = BookingLedger::new();
        let mut fleet = FleetRegistry::new();
        let mut coordinator = ReassignmentCoordinator::new();
        let now = Utc::now();

        let (booking_id, _, replacement) = seeded(&mut ledger, &mut fleet);
        coordinator
            .initiate(&mut ledger, &fleet, booking_id, replacement, "swap".into(), now)
            .unwrap();

        // The review reset means a second initiate also fails the outcome gate,
        // so re-reject before probing the pending-token guard.
        let host = ledger.get(&booking_id).unwrap().host_id;
        ledger
            .record_review(&booking_id, host, ReviewOutcome::Rejected, None, now)
            .unwrap();

        let again =
            coordinator.initiate(&mut ledger, &fleet, booking_id, replacement, "swap".into(), now);
        assert!(matches!(again, Err(MatchError::Conflict(_))));
    }
}
