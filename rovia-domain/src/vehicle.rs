use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the security deposit for a vehicle is determined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositMode {
    /// Platform default, subject to any per-make override
    PlatformDefault,
    /// Host pinned an explicit amount for this vehicle
    Fixed { amount_dollars: i32 },
}

/// A host-owned vehicle. Read-mostly reference data for the engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub host_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vehicle_class: Option<String>,
    pub daily_rate_cents: i32,
    pub is_active: bool,
    pub deposit_mode: DepositMode,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(host_id: Uuid, make: String, model: String, year: i32, daily_rate_cents: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            host_id,
            make,
            model,
            year,
            vehicle_class: None,
            daily_rate_cents,
            is_active: true,
            deposit_mode: DepositMode::PlatformDefault,
            created_at: Utc::now(),
        }
    }
}
