use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pii::Masked;

/// Reservation request lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Open,
    Claimed,
    CarAssigned,
    Fulfilled,
    Declined,
    Expired,
    Archived,
}

impl RequestStatus {
    /// Terminal statuses never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Fulfilled
                | RequestStatus::Declined
                | RequestStatus::Expired
                | RequestStatus::Archived
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestPriority {
    Low,
    Standard,
    High,
    Urgent,
}

/// What the guest is asking for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRequirements {
    pub vehicle_type: Option<String>,
    pub vehicle_class: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub quantity: i32,
}

/// Inclusive rental window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Two inclusive ranges overlap when each starts no later than the other ends.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPricing {
    pub daily_rate_cents: i32,
    pub total_budget_cents: Option<i32>,
    pub negotiable: bool,
}

/// A guest's demand ticket for a vehicle over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub id: Uuid,
    pub code: String,
    pub guest_name: String,
    pub guest_email: Masked<String>,
    pub guest_phone: Option<String>,
    pub requirements: VehicleRequirements,
    pub dates: Option<DateRange>,
    pub pricing: RequestPricing,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRequest {
    /// Update request status
    pub fn update_status(&mut self, new_status: RequestStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overlap_detection() {
        let booked = DateRange::new(date(2026, 9, 1), date(2026, 9, 5));

        // Straddles the booked window
        assert!(booked.overlaps(&DateRange::new(date(2026, 9, 4), date(2026, 9, 8))));
        // Shares exactly one boundary day
        assert!(booked.overlaps(&DateRange::new(date(2026, 9, 5), date(2026, 9, 9))));
        // Fully contained
        assert!(booked.overlaps(&DateRange::new(date(2026, 9, 2), date(2026, 9, 3))));
        // Disjoint
        assert!(!booked.overlaps(&DateRange::new(date(2026, 9, 6), date(2026, 9, 9))));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!RequestStatus::Open.is_terminal());
        assert!(!RequestStatus::Claimed.is_terminal());
        assert!(!RequestStatus::CarAssigned.is_terminal());
        assert!(RequestStatus::Fulfilled.is_terminal());
        assert!(RequestStatus::Archived.is_terminal());
    }
}
