use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::LazyExpire;

/// Claim lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    PendingCar,
    CarSelected,
    Confirmed,
    Expired,
    Released,
}

impl ClaimStatus {
    /// A claim in an active status blocks any other host from the request.
    pub fn is_active(&self) -> bool {
        matches!(self, ClaimStatus::PendingCar | ClaimStatus::CarSelected)
    }

    /// Terminal statuses are final; claims are kept for audit, never deleted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Confirmed | ClaimStatus::Expired | ClaimStatus::Released
        )
    }
}

/// An exclusive, time-boxed option one host holds on one reservation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestClaim {
    pub id: Uuid,
    pub request_id: Uuid,
    pub host_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub status: ClaimStatus,
    pub offered_rate_cents: Option<i32>,
    pub claimed_at: DateTime<Utc>,
    pub claim_expires_at: DateTime<Utc>,
    pub car_assigned_at: Option<DateTime<Utc>>,
}

impl RequestClaim {
    pub fn new(request_id: Uuid, host_id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            host_id,
            vehicle_id: None,
            status: ClaimStatus::PendingCar,
            offered_rate_cents: None,
            claimed_at: now,
            claim_expires_at: now + ttl,
            car_assigned_at: None,
        }
    }
}

impl LazyExpire for RequestClaim {
    fn deadline(&self) -> DateTime<Utc> {
        self.claim_expires_at
    }

    // Only a claim still waiting for a car can silently lapse; once a car is
    // selected the hand-off to booking creation owns the lifecycle.
    fn expirable(&self) -> bool {
        self.status == ClaimStatus::PendingCar
    }

    fn expire(&mut self) {
        self.status = ClaimStatus::Expired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::flip_if_expired;

    #[test]
    fn test_pending_claim_expires() {
        let now = Utc::now();
        let mut claim = RequestClaim::new(Uuid::new_v4(), Uuid::new_v4(), Duration::minutes(30), now);

        assert!(!flip_if_expired(&mut claim, now + Duration::minutes(29)));
        assert!(flip_if_expired(&mut claim, now + Duration::minutes(31)));
        assert_eq!(claim.status, ClaimStatus::Expired);
    }

    #[test]
    fn test_selected_claim_does_not_expire() {
        let now = Utc::now();
        let mut claim = RequestClaim::new(Uuid::new_v4(), Uuid::new_v4(), Duration::minutes(30), now);
        claim.status = ClaimStatus::CarSelected;

        assert!(!flip_if_expired(&mut claim, now + Duration::hours(2)));
        assert_eq!(claim.status, ClaimStatus::CarSelected);
    }
}
