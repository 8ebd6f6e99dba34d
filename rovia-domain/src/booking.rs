use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pii::Masked;
use crate::request::DateRange;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status blocks the vehicle's calendar.
    pub fn blocks_calendar(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewOutcome {
    Approved,
    Rejected,
}

/// Host-side review of a freshly assigned booking. All fields reset to null
/// when the booking is routed to a replacement vehicle's owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostReview {
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub outcome: Option<ReviewOutcome>,
}

impl HostReview {
    pub fn reset(&mut self) {
        *self = HostReview::default();
    }
}

/// A materialized rental. Created by the external booking collaborator once
/// a claim reaches CAR_SELECTED; the engine only repoints its vehicle and
/// review fields during reassignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub request_id: Option<Uuid>,
    pub claim_id: Option<Uuid>,
    pub vehicle_id: Uuid,
    pub host_id: Uuid,
    pub guest_name: String,
    pub guest_email: Masked<String>,
    pub dates: DateRange,
    pub daily_rate_cents: i32,
    pub status: BookingStatus,
    pub host_review: HostReview,
    pub original_vehicle_id: Option<Uuid>,
    pub vehicle_change_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Single-use, time-boxed credential authorizing a guest to consent to a
/// vehicle substitution on one booking. Never reused, never reissued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignmentToken {
    pub token: String,
    pub booking_id: Uuid,
    pub original_vehicle_id: Uuid,
    pub replacement_vehicle_id: Uuid,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl ReassignmentToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Mark as consumed. Permanent: a consumed token never authorizes again.
    pub fn consume(&mut self, now: DateTime<Utc>) {
        self.consumed = true;
        self.consumed_at = Some(now);
    }
}
