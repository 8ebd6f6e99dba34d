use chrono::{DateTime, Utc};
use rovia_domain::{ClaimStatus, RequestClaim, RequestStatus};
use rovia_fleet::{BookingLedger, FleetRegistry};
use uuid::Uuid;

use crate::board::{MatchError, RequestBoard};

/// Attaches a concrete vehicle to an active claim.
pub struct AssignmentResolver;

impl AssignmentResolver {
    /// Assign a vehicle to the caller's PENDING_CAR claim on a request.
    ///
    /// A calendar conflict or a failed precondition leaves the claim and the
    /// request exactly as they were; the only partial effect possible is the
    /// expiry flip, which is its own committed transition.
    pub fn assign_car(
        board: &mut RequestBoard,
        fleet: &FleetRegistry,
        ledger: &BookingLedger,
        request_id: Uuid,
        host_id: Uuid,
        vehicle_id: Uuid,
        offered_rate_cents: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<RequestClaim, MatchError> {
        // 1. Expiry first: a lapsed hold reopens the request before anything else.
        board.reap(request_id, now);

        if !board.requests.contains_key(&request_id) {
            return Err(MatchError::NotFound(format!("request {}", request_id)));
        }

        let claim_id = match board
            .claims
            .values()
            .find(|c| c.request_id == request_id && c.host_id == host_id)
        {
            Some(claim) => match claim.status {
                ClaimStatus::PendingCar => claim.id,
                ClaimStatus::Expired => {
                    return Err(MatchError::Expired(format!("claim {} has expired", claim.id)))
                }
                other => {
                    return Err(MatchError::Conflict(format!(
                        "claim {} is not awaiting a car (status {:?})",
                        claim.id, other
                    )))
                }
            },
            None => {
                if board
                    .claims
                    .values()
                    .any(|c| c.request_id == request_id && c.status.is_active())
                {
                    return Err(MatchError::Forbidden(
                        "request is claimed by another host".into(),
                    ));
                }
                return Err(MatchError::NotFound(format!(
                    "no claim held on request {}",
                    request_id
                )));
            }
        };

        // 2. The vehicle must be an active listing owned by the caller.
        let vehicle = fleet
            .get(&vehicle_id)
            .ok_or_else(|| MatchError::NotFound(format!("vehicle {}", vehicle_id)))?;
        if vehicle.host_id != host_id || !vehicle.is_active {
            return Err(MatchError::NotFound(format!(
                "vehicle {} is not an active listing of host {}",
                vehicle_id, host_id
            )));
        }

        // 3. Calendar check against confirmed/active bookings.
        if let Some(dates) = board.requests.get(&request_id).and_then(|r| r.dates) {
            if !ledger.conflicts_for(&vehicle_id, &dates).is_empty() {
                return Err(MatchError::Conflict(format!(
                    "vehicle {} is booked over the requested dates",
                    vehicle_id
                )));
            }
        }

        // 4. Commit: claim and request flip together.
        let claim = board
            .claims
            .get_mut(&claim_id)
            .ok_or_else(|| MatchError::NotFound(format!("claim {}", claim_id)))?;
        claim.vehicle_id = Some(vehicle_id);
        claim.car_assigned_at = Some(now);
        claim.offered_rate_cents = Some(offered_rate_cents.unwrap_or(vehicle.daily_rate_cents));
        claim.status = ClaimStatus::CarSelected;
        let assigned = claim.clone();

        if let Some(request) = board.requests.get_mut(&request_id) {
            request.update_status(RequestStatus::CarAssigned);
        }
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::NewRequest;
    use chrono::{Duration, NaiveDate};
    use rovia_domain::{
        Booking, BookingStatus, DateRange, HostReview, RequestPricing, RequestPriority, Vehicle,
        VehicleRequirements,
    };

    fn request_for(dates: Option<DateRange>) -> NewRequest {
        NewRequest {
            guest_name: "Dana Guest".into(),
            guest_email: "dana@example.com".into(),
            guest_phone: None,
            requirements: VehicleRequirements {
                vehicle_type: Some("sedan".into()),
                vehicle_class: None,
                make: None,
                model: None,
                quantity: 1,
            },
            dates,
            pricing: RequestPricing {
                daily_rate_cents: 5500,
                total_budget_cents: None,
                negotiable: false,
            },
            pickup_location: "SFO".into(),
            dropoff_location: None,
            priority: RequestPriority::Standard,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn confirmed_booking(vehicle_id: Uuid, host_id: Uuid, dates: DateRange) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            request_id: None,
            claim_id: None,
            vehicle_id,
            host_id,
            guest_name: "Prior Guest".into(),
            guest_email: "prior@example.com".to_string().into(),
            dates,
            daily_rate_cents: 5000,
            status: BookingStatus::Confirmed,
            host_review: HostReview::default(),
            original_vehicle_id: None,
            vehicle_change_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_assignment_happy_path() {
        let mut board = RequestBoard::new();
        let mut fleet = FleetRegistry::new();
        let ledger = BookingLedger::new();
        let now = Utc::now();

        let host_id = Uuid::new_v4();
        let vehicle = Vehicle::new(host_id, "Toyota".into(), "Corolla".into(), 2022, 4500);
        let vehicle_id = fleet.register(vehicle);

        let window = DateRange::new(date(2099, 9, 1), date(2099, 9, 5));
        let request = board.publish(request_for(Some(window)));
        board.claim(request.id, host_id, Duration::minutes(30), now).unwrap();

        let claim = AssignmentResolver::assign_car(
            &mut board, &fleet, &ledger, request.id, host_id, vehicle_id, None, now,
        )
        .unwrap();

        assert_eq!(claim.status, ClaimStatus::CarSelected);
        assert_eq!(claim.vehicle_id, Some(vehicle_id));
        // Falls back to the vehicle's base daily rate
        assert_eq!(claim.offered_rate_cents, Some(4500));
        assert_eq!(
            board.request(request.id, now).unwrap().status,
            RequestStatus::CarAssigned
        );
    }

    #[test]
    fn test_calendar_conflict_leaves_claim_untouched() {
        let mut board = RequestBoard::new();
        let mut fleet = FleetRegistry::new();
        let mut ledger = BookingLedger::new();
        let now = Utc::now();

        let host_id = Uuid::new_v4();
        let vehicle_id = fleet.register(Vehicle::new(host_id, "Honda".into(), "Civic".into(), 2021, 4800));

        let window = DateRange::new(date(2099, 9, 1), date(2099, 9, 5));
        ledger.insert(confirmed_booking(
            vehicle_id,
            host_id,
            DateRange::new(date(2099, 9, 5), date(2099, 9, 9)),
        ));

        let request = board.publish(request_for(Some(window)));
        let claim = board.claim(request.id, host_id, Duration::minutes(30), now).unwrap();

        let result = AssignmentResolver::assign_car(
            &mut board, &fleet, &ledger, request.id, host_id, vehicle_id, Some(5200), now,
        );
        assert!(matches!(result, Err(MatchError::Conflict(_))));

        // No partial mutation
        let untouched = board.claim_record(&claim.id).unwrap();
        assert_eq!(untouched.status, ClaimStatus::PendingCar);
        assert_eq!(untouched.vehicle_id, None);
        assert_eq!(
            board.request(request.id, now).unwrap().status,
            RequestStatus::Claimed
        );
    }

    #[test]
    fn test_expired_claim_short_circuits_and_reopens() {
        let mut board = RequestBoard::new();
        let mut fleet = FleetRegistry::new();
        let ledger = BookingLedger::new();
        let now = Utc::now();

        let host_id = Uuid::new_v4();
        let vehicle_id = fleet.register(Vehicle::new(host_id, "Ford".into(), "Focus".into(), 2020, 4000));

        let request = board.publish(request_for(Some(DateRange::new(date(2099, 9, 1), date(2099, 9, 5)))));
        board.claim(request.id, host_id, Duration::minutes(30), now).unwrap();

        let later = now + Duration::minutes(45);
        let result = AssignmentResolver::assign_car(
            &mut board, &fleet, &ledger, request.id, host_id, vehicle_id, None, later,
        );
        assert!(matches!(result, Err(MatchError::Expired(_))));
        assert_eq!(
            board.request(request.id, later).unwrap().status,
            RequestStatus::Open
        );
    }

    #[test]
    fn test_foreign_or_inactive_vehicle_rejected() {
        let mut board = RequestBoard::new();
        let mut fleet = FleetRegistry::new();
        let ledger = BookingLedger::new();
        let now = Utc::now();

        let host_id = Uuid::new_v4();
        let other_host = Uuid::new_v4();
        let foreign = fleet.register(Vehicle::new(other_host, "Kia".into(), "Rio".into(), 2019, 3500));
        let parked = fleet.register(Vehicle::new(host_id, "Kia".into(), "Soul".into(), 2023, 5200));
        fleet.set_active(&parked, false).unwrap();

        let request = board.publish(request_for(None));
        board.claim(request.id, host_id, Duration::minutes(30), now).unwrap();

        for vehicle_id in [foreign, parked] {
            let result = AssignmentResolver::assign_car(
                &mut board, &fleet, &ledger, request.id, host_id, vehicle_id, None, now,
            );
            assert!(matches!(result, Err(MatchError::NotFound(_))));
        }
    }

    #[test]
    fn test_non_claimant_is_forbidden() {
        let mut board = RequestBoard::new();
        let mut fleet = FleetRegistry::new();
        let ledger = BookingLedger::new();
        let now = Utc::now();

        let holder = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let vehicle_id = fleet.register(Vehicle::new(intruder, "Mazda".into(), "3".into(), 2022, 4700));

        let request = board.publish(request_for(None));
        board.claim(request.id, holder, Duration::minutes(30), now).unwrap();

        let result = AssignmentResolver::assign_car(
            &mut board, &fleet, &ledger, request.id, intruder, vehicle_id, None, now,
        );
        assert!(matches!(result, Err(MatchError::Forbidden(_))));
    }
}
