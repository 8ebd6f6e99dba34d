use chrono::{DateTime, Duration, Utc};
use rovia_domain::{
    flip_if_expired, ClaimStatus, DateRange, RequestClaim, RequestPricing, RequestPriority,
    RequestStatus, ReservationRequest, VehicleRequirements,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Intake payload handed over by the external request-capture collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub requirements: VehicleRequirements,
    pub dates: Option<DateRange>,
    pub pricing: RequestPricing,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub priority: RequestPriority,
}

/// Owns reservation requests and the claims held against them.
///
/// A request and its claims form one aggregate: every mutation runs inside a
/// single `&mut self` critical section, so the status checks below are
/// compare-and-swap transitions — two concurrent claimants serialize and
/// exactly one observes OPEN.
pub struct RequestBoard {
    pub(crate) requests: HashMap<Uuid, ReservationRequest>,
    pub(crate) claims: HashMap<Uuid, RequestClaim>,
    seq: u64,
}

impl RequestBoard {
    pub fn new() -> Self {
        Self {
            requests: HashMap::new(),
            claims: HashMap::new(),
            seq: 0,
        }
    }

    /// Publish a new request onto the board with a human-readable code.
    pub fn publish(&mut self, input: NewRequest) -> ReservationRequest {
        self.seq += 1;
        let now = Utc::now();
        let request = ReservationRequest {
            id: Uuid::new_v4(),
            code: format!("RQ-{:06}", self.seq),
            guest_name: input.guest_name,
            guest_email: input.guest_email.into(),
            guest_phone: input.guest_phone,
            requirements: input.requirements,
            dates: input.dates,
            pricing: input.pricing,
            pickup_location: input.pickup_location,
            dropoff_location: input.dropoff_location,
            priority: input.priority,
            status: RequestStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.requests.insert(request.id, request.clone());
        request
    }

    /// Fetch a request, applying lazy expiry first.
    pub fn request(&mut self, request_id: Uuid, now: DateTime<Utc>) -> Result<&ReservationRequest, MatchError> {
        self.reap(request_id, now);
        self.requests
            .get(&request_id)
            .ok_or_else(|| MatchError::NotFound(format!("request {}", request_id)))
    }

    pub fn claim_record(&self, claim_id: &Uuid) -> Option<&RequestClaim> {
        self.claims.get(claim_id)
    }

    /// The claim currently blocking other hosts from the request, if any.
    pub fn active_claim(&self, request_id: Uuid) -> Option<&RequestClaim> {
        self.claims
            .values()
            .find(|c| c.request_id == request_id && c.status.is_active())
    }

    /// Take an exclusive, time-boxed option on an OPEN request.
    ///
    /// The OPEN check and the transition to CLAIMED happen in one critical
    /// section; a concurrent claimant gets `Conflict`, never a second claim.
    pub fn claim(
        &mut self,
        request_id: Uuid,
        host_id: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<RequestClaim, MatchError> {
        self.reap(request_id, now);

        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| MatchError::NotFound(format!("request {}", request_id)))?;

        if request.status == RequestStatus::Expired {
            return Err(MatchError::Expired(format!("request {} has lapsed", request_id)));
        }
        if request.status != RequestStatus::Open {
            return Err(MatchError::Conflict(format!(
                "request {} is not open (status {:?})",
                request_id, request.status
            )));
        }
        // One claim row per (request, host), ever: the claim trail is audit data.
        if self
            .claims
            .values()
            .any(|c| c.request_id == request_id && c.host_id == host_id)
        {
            return Err(MatchError::Conflict(format!(
                "host {} already claimed request {}",
                host_id, request_id
            )));
        }

        let claim = RequestClaim::new(request_id, host_id, ttl, now);
        request.update_status(RequestStatus::Claimed);
        self.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    /// Voluntary release by the claiming host; the request reopens.
    pub fn release(
        &mut self,
        claim_id: Uuid,
        host_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RequestClaim, MatchError> {
        self.reap_claim(claim_id, now);

        let claim = self
            .claims
            .get_mut(&claim_id)
            .ok_or_else(|| MatchError::NotFound(format!("claim {}", claim_id)))?;

        if claim.host_id != host_id {
            return Err(MatchError::Forbidden("claim belongs to another host".into()));
        }
        match claim.status {
            ClaimStatus::PendingCar => {}
            ClaimStatus::Expired => {
                return Err(MatchError::Expired(format!("claim {} has expired", claim_id)))
            }
            other => {
                return Err(MatchError::Conflict(format!(
                    "claim {} is not releasable (status {:?})",
                    claim_id, other
                )))
            }
        }

        claim.status = ClaimStatus::Released;
        let released = claim.clone();
        if let Some(request) = self.requests.get_mut(&released.request_id) {
            if request.status == RequestStatus::Claimed {
                request.update_status(RequestStatus::Open);
            }
        }
        Ok(released)
    }

    /// Hand-off completion: the external booking collaborator materialized
    /// the booking for a CAR_SELECTED claim.
    pub fn confirm_fulfillment(&mut self, claim_id: Uuid) -> Result<(), MatchError> {
        let claim = self
            .claims
            .get_mut(&claim_id)
            .ok_or_else(|| MatchError::NotFound(format!("claim {}", claim_id)))?;

        if claim.status != ClaimStatus::CarSelected {
            return Err(MatchError::Conflict(format!(
                "claim {} is not awaiting fulfillment (status {:?})",
                claim_id, claim.status
            )));
        }

        claim.status = ClaimStatus::Confirmed;
        let request_id = claim.request_id;
        if let Some(request) = self.requests.get_mut(&request_id) {
            request.update_status(RequestStatus::Fulfilled);
        }
        Ok(())
    }

    /// Guest or operator withdraws an open request.
    pub fn decline(&mut self, request_id: Uuid, now: DateTime<Utc>) -> Result<(), MatchError> {
        self.reap(request_id, now);

        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| MatchError::NotFound(format!("request {}", request_id)))?;

        if request.status != RequestStatus::Open {
            return Err(MatchError::Conflict(format!(
                "request {} is not open (status {:?})",
                request_id, request.status
            )));
        }
        request.update_status(RequestStatus::Declined);
        Ok(())
    }

    /// Soft delete. Requests are archived from a terminal status, never destroyed.
    pub fn archive(&mut self, request_id: Uuid) -> Result<(), MatchError> {
        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| MatchError::NotFound(format!("request {}", request_id)))?;

        if request.status == RequestStatus::Archived {
            return Err(MatchError::Conflict(format!("request {} is already archived", request_id)));
        }
        if !request.status.is_terminal() {
            return Err(MatchError::Conflict(format!(
                "request {} is still in flight (status {:?})",
                request_id, request.status
            )));
        }
        request.update_status(RequestStatus::Archived);
        Ok(())
    }

    /// Proactive expiry pass for list-view freshness. Correctness never
    /// depends on this running; every operation reaps on its own.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let reopened: Vec<Uuid> = self
            .claims
            .values_mut()
            .filter_map(|claim| flip_if_expired(claim, now).then_some(claim.request_id))
            .collect();
        for request_id in &reopened {
            if let Some(request) = self.requests.get_mut(request_id) {
                if request.status == RequestStatus::Claimed {
                    request.update_status(RequestStatus::Open);
                }
            }
        }

        let mut flipped = reopened.len();
        for request in self.requests.values_mut() {
            if request.status == RequestStatus::Open {
                if let Some(dates) = request.dates {
                    if dates.end < now.date_naive() {
                        request.update_status(RequestStatus::Expired);
                        flipped += 1;
                    }
                }
            }
        }
        flipped
    }

    /// Lazy expiry for everything attached to a request: flips a lapsed
    /// PENDING_CAR claim to EXPIRED and reopens the request, and retires an
    /// open request whose rental window has fully passed.
    pub(crate) fn reap(&mut self, request_id: Uuid, now: DateTime<Utc>) {
        let mut reopened = false;
        if let Some(claim) = self
            .claims
            .values_mut()
            .find(|c| c.request_id == request_id && c.status == ClaimStatus::PendingCar)
        {
            reopened = flip_if_expired(claim, now);
        }

        if let Some(request) = self.requests.get_mut(&request_id) {
            if reopened && request.status == RequestStatus::Claimed {
                request.update_status(RequestStatus::Open);
            }
            if request.status == RequestStatus::Open {
                if let Some(dates) = request.dates {
                    if dates.end < now.date_naive() {
                        request.update_status(RequestStatus::Expired);
                    }
                }
            }
        }
    }

    pub(crate) fn reap_claim(&mut self, claim_id: Uuid, now: DateTime<Utc>) {
        if let Some(claim) = self.claims.get_mut(&claim_id) {
            if flip_if_expired(claim, now) {
                let request_id = claim.request_id;
                if let Some(request) = self.requests.get_mut(&request_id) {
                    if request.status == RequestStatus::Claimed {
                        request.update_status(RequestStatus::Open);
                    }
                }
            }
        }
    }
}

impl Default for RequestBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
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
}
