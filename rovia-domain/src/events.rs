use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::invitation::InvitationStatus;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClaimCreatedEvent {
    pub request_id: Uuid,
    pub claim_id: Uuid,
    pub host_id: Uuid,
    pub claim_expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CarAssignedEvent {
    pub request_id: Uuid,
    pub claim_id: Uuid,
    pub vehicle_id: Uuid,
    pub offered_rate_cents: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReassignmentInitiatedEvent {
    pub booking_id: Uuid,
    pub replacement_vehicle_id: Uuid,
    pub token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VehicleReassignedEvent {
    pub booking_id: Uuid,
    pub vehicle_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvitationUpdatedEvent {
    pub invitation_id: Uuid,
    pub status: InvitationStatus,
    pub negotiation_rounds: u8,
}
