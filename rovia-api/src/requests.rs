use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use rovia_domain::events::{CarAssignedEvent, ClaimCreatedEvent};
use rovia_domain::{RequestClaim, ReservationRequest};
use rovia_match::{AssignmentResolver, NewRequest};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::notify::{self, Notification};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ClaimBody {
    host_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ReleaseBody {
    host_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct AssignBody {
    host_id: Uuid,
    vehicle_id: Uuid,
    offered_rate_cents: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/requests", post(publish_request))
        .route("/v1/requests/{id}", get(get_request))
        .route("/v1/requests/{id}/claims", post(claim_request))
        .route("/v1/requests/{id}/vehicle", post(assign_vehicle))
        .route("/v1/requests/{id}/decline", post(decline_request))
        .route("/v1/requests/{id}/archive", post(archive_request))
        .route("/v1/claims/{id}/release", post(release_claim))
        .route("/v1/claims/{id}/fulfillment", post(confirm_fulfillment))
}

async fn publish_request(
    State(state): State<AppState>,
    Json(body): Json<NewRequest>,
) -> Result<Json<ReservationRequest>, ApiError> {
    if body.requirements.quantity < 1 {
        return Err(ApiError::Validation("quantity must be at least 1".into()));
    }
    if let Some(dates) = &body.dates {
        if dates.end < dates.start {
            return Err(ApiError::Validation("date range ends before it starts".into()));
        }
    }

    let request = state.board.write().await.publish(body);
    Ok(Json(request))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationRequest>, ApiError> {
    let mut board = state.board.write().await;
    let request = board.request(id, Utc::now())?;
    Ok(Json(request.clone()))
}

async fn claim_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ClaimBody>,
) -> Result<Json<RequestClaim>, ApiError> {
    let ttl = Duration::minutes(state.rules.claim_ttl_minutes as i64);
    let now = Utc::now();
    let (claim, guest_email) = {
        let mut board = state.board.write().await;
        let claim = board.claim(id, body.host_id, ttl, now)?;
        let guest_email = board.request(id, now)?.guest_email.clone();
        (claim, guest_email)
    };

    notify::dispatch(
        state.notifier.clone(),
        Notification::ClaimCreated {
            guest_email,
            event: ClaimCreatedEvent {
                request_id: claim.request_id,
                claim_id: claim.id,
                host_id: claim.host_id,
                claim_expires_at: claim.claim_expires_at,
            },
        },
    );
    Ok(Json(claim))
}

async fn release_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReleaseBody>,
) -> Result<Json<RequestClaim>, ApiError> {
    let claim = state
        .board
        .write()
        .await
        .release(id, body.host_id, Utc::now())?;
    Ok(Json(claim))
}

async fn assign_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignBody>,
) -> Result<Json<RequestClaim>, ApiError> {
    let now = Utc::now();
    let (claim, guest_email) = {
        let mut board = state.board.write().await;
        let fleet = state.fleet.read().await;
        let bookings = state.bookings.read().await;

        let claim = AssignmentResolver::assign_car(
            &mut board,
            &fleet,
            &bookings,
            id,
            body.host_id,
            body.vehicle_id,
            body.offered_rate_cents,
            now,
        )?;
        let guest_email = board.request(id, now)?.guest_email.clone();
        (claim, guest_email)
    };

    notify::dispatch(
        state.notifier.clone(),
        Notification::CarAssigned {
            guest_email,
            event: CarAssignedEvent {
                request_id: id,
                claim_id: claim.id,
                vehicle_id: body.vehicle_id,
                offered_rate_cents: claim.offered_rate_cents.unwrap_or_default(),
            },
        },
    );
    Ok(Json(claim))
}

async fn decline_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.board.write().await.decline(id, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}

async fn archive_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.board.write().await.archive(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn confirm_fulfillment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.board.write().await.confirm_fulfillment(id)?;
    Ok(StatusCode::NO_CONTENT)
}
