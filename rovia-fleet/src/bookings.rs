use chrono::{DateTime, Utc};
use rovia_domain::{Booking, DateRange, HostReview, ReviewOutcome};
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory booking ledger. Bookings are created by the external booking
/// collaborator; the engine consults the ledger for calendar conflicts and
/// mutates review/vehicle fields during reassignment.
pub struct BookingLedger {
    bookings: HashMap<Uuid, Booking>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            bookings: HashMap::new(),
        }
    }

    pub fn insert(&mut self, booking: Booking) -> Uuid {
        let id = booking.id;
        self.bookings.insert(id, booking);
        id
    }

    pub fn get(&self, booking_id: &Uuid) -> Option<&Booking> {
        self.bookings.get(booking_id)
    }

    pub fn get_mut(&mut self, booking_id: &Uuid) -> Option<&mut Booking> {
        self.bookings.get_mut(booking_id)
    }

    /// IDs of bookings on this vehicle that block the calendar and overlap
    /// the requested window.
    pub fn conflicts_for(&self, vehicle_id: &Uuid, range: &DateRange) -> Vec<Uuid> {
        self.bookings
            .values()
            .filter(|b| {
                b.vehicle_id == *vehicle_id
                    && b.status.blocks_calendar()
                    && b.dates.overlaps(range)
            })
            .map(|b| b.id)
            .collect()
    }

    /// Record the host-review verdict on a booking. A booking is reviewed
    /// once per routing; re-review requires the fields to have been reset.
    pub fn record_review(
        &mut self,
        booking_id: &Uuid,
        reviewer: Uuid,
        outcome: ReviewOutcome,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let booking = self
            .bookings
            .get_mut(booking_id)
            .ok_or_else(|| LedgerError::NotFound(booking_id.to_string()))?;

        if booking.host_review.outcome.is_some() {
            return Err(LedgerError::AlreadyReviewed(booking_id.to_string()));
        }

        booking.host_review = HostReview {
            reviewed_by: Some(reviewer),
            reviewed_at: Some(now),
            notes,
            outcome: Some(outcome),
        };
        booking.touch();
        Ok(())
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Booking already reviewed: {0}")]
    AlreadyReviewed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rovia_domain::BookingStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(vehicle_id: Uuid, start: NaiveDate, end: NaiveDate, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            request_id: None,
            claim_id: None,
            vehicle_id,
            host_id: Uuid::new_v4(),
            guest_name: "Dana Guest".into(),
            guest_email: "dana@example.com".to_string().into(),
            dates: DateRange::new(start, end),
            daily_rate_cents: 5000,
            status,
            host_review: HostReview::default(),
            original_vehicle_id: None,
            vehicle_change_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_conflict_query_checks_status_and_overlap() {
        let mut ledger = BookingLedger::new();
        let vehicle_id = Uuid::new_v4();

        let confirmed = booking(vehicle_id, date(2026, 9, 1), date(2026, 9, 5), BookingStatus::Confirmed);
        let cancelled = booking(vehicle_id, date(2026, 9, 10), date(2026, 9, 12), BookingStatus::Cancelled);
        let confirmed_id = confirmed.id;
        ledger.insert(confirmed);
        ledger.insert(cancelled);

        // Overlaps the confirmed booking on its last day
        let hits = ledger.conflicts_for(&vehicle_id, &DateRange::new(date(2026, 9, 5), date(2026, 9, 8)));
        assert_eq!(hits, vec![confirmed_id]);

        // Cancelled bookings never block the calendar
        let hits = ledger.conflicts_for(&vehicle_id, &DateRange::new(date(2026, 9, 10), date(2026, 9, 11)));
        assert!(hits.is_empty());

        // Other vehicles are unaffected
        let hits = ledger.conflicts_for(&Uuid::new_v4(), &DateRange::new(date(2026, 9, 1), date(2026, 9, 5)));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_review_recorded_once() {
        let mut ledger = BookingLedger::new();
        let b = booking(Uuid::new_v4(), date(2026, 9, 1), date(2026, 9, 5), BookingStatus::Confirmed);
        let id = ledger.insert(b);
        let reviewer = Uuid::new_v4();

        ledger
            .record_review(&id, reviewer, ReviewOutcome::Rejected, Some("mileage cap".into()), Utc::now())
            .unwrap();

        let again = ledger.record_review(&id, reviewer, ReviewOutcome::Approved, None, Utc::now());
        assert!(matches!(again, Err(LedgerError::AlreadyReviewed(_))));
    }
}
