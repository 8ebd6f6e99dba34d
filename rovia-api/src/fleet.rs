use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rovia_domain::{
    Booking, BookingStatus, DateRange, DepositMode, HostReview, ReviewOutcome, Vehicle,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct NewVehicleBody {
    host_id: Uuid,
    make: String,
    model: String,
    year: i32,
    vehicle_class: Option<String>,
    daily_rate_cents: i32,
    deposit_mode: Option<DepositMode>,
}

#[derive(Debug, Deserialize)]
struct SetActiveBody {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct SetRateBody {
    daily_rate_cents: i32,
}

#[derive(Debug, Deserialize)]
struct NewBookingBody {
    request_id: Option<Uuid>,
    claim_id: Option<Uuid>,
    vehicle_id: Uuid,
    guest_name: String,
    guest_email: String,
    dates: DateRange,
    daily_rate_cents: i32,
}

#[derive(Debug, Deserialize)]
struct ReviewBody {
    reviewer_id: Uuid,
    outcome: ReviewOutcome,
    notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vehicles", post(register_vehicle))
        .route("/v1/vehicles/{id}/active", post(set_vehicle_active))
        .route("/v1/vehicles/{id}/rate", post(set_vehicle_rate))
        .route("/v1/hosts/{id}/vehicles", get(host_vehicles))
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/review", post(record_review))
}

async fn register_vehicle(
    State(state): State<AppState>,
    Json(body): Json<NewVehicleBody>,
) -> Result<Json<Vehicle>, ApiError> {
    if body.daily_rate_cents <= 0 {
        return Err(ApiError::Validation("daily rate must be positive".into()));
    }

    let mut vehicle = Vehicle::new(body.host_id, body.make, body.model, body.year, body.daily_rate_cents);
    vehicle.vehicle_class = body.vehicle_class;
    if let Some(mode) = body.deposit_mode {
        vehicle.deposit_mode = mode;
    }

    let snapshot = vehicle.clone();
    state.fleet.write().await.register(vehicle);
    Ok(Json(snapshot))
}

async fn set_vehicle_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetActiveBody>,
) -> Result<StatusCode, ApiError> {
    state.fleet.write().await.set_active(&id, body.active)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_vehicle_rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetRateBody>,
) -> Result<StatusCode, ApiError> {
    if body.daily_rate_cents <= 0 {
        return Err(ApiError::Validation("daily rate must be positive".into()));
    }
    state
        .fleet
        .write()
        .await
        .set_daily_rate(&id, body.daily_rate_cents)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn host_vehicles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    let fleet = state.fleet.read().await;
    let vehicles = fleet.vehicles_for_host(&id).into_iter().cloned().collect();
    Ok(Json(vehicles))
}

/// Intake seam for the external booking-creation collaborator: a confirmed
/// booking lands here once payment clears.
async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<NewBookingBody>,
) -> Result<Json<Booking>, ApiError> {
    let host_id = {
        let fleet = state.fleet.read().await;
        let vehicle = fleet
            .get(&body.vehicle_id)
            .ok_or_else(|| ApiError::NotFound(format!("vehicle {}", body.vehicle_id)))?;
        vehicle.host_id
    };

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        request_id: body.request_id,
        claim_id: body.claim_id,
        vehicle_id: body.vehicle_id,
        host_id,
        guest_name: body.guest_name,
        guest_email: body.guest_email.into(),
        dates: body.dates,
        daily_rate_cents: body.daily_rate_cents,
        status: BookingStatus::Confirmed,
        host_review: HostReview::default(),
        original_vehicle_id: None,
        vehicle_change_reason: None,
        created_at: now,
        updated_at: now,
    };

    let snapshot = booking.clone();
    state.bookings.write().await.insert(booking);
    Ok(Json(snapshot))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    let bookings = state.bookings.read().await;
    let booking = bookings
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("booking {}", id)))?;
    Ok(Json(booking.clone()))
}

async fn record_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<StatusCode, ApiError> {
    state.bookings.write().await.record_review(
        &id,
        body.reviewer_id,
        body.outcome,
        body.notes,
        Utc::now(),
    )?;
    Ok(StatusCode::NO_CONTENT)
}
