use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use rovia_domain::events::{ReassignmentInitiatedEvent, VehicleReassignedEvent};
use rovia_domain::ReassignmentToken;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::notify::{self, Notification};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct InitiateBody {
    replacement_vehicle_id: Uuid,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ConsumeResponse {
    booking_id: Uuid,
    vehicle_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{id}/reassignment", post(initiate_reassignment))
        .route("/v1/reassignments/{token}/consume", post(consume_token))
}

async fn initiate_reassignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<InitiateBody>,
) -> Result<Json<ReassignmentToken>, ApiError> {
    let (token, guest_email) = {
        let fleet = state.fleet.read().await;
        let mut bookings = state.bookings.write().await;
        let mut coordinator = state.reassignments.write().await;

        let token = coordinator.initiate(
            &mut bookings,
            &fleet,
            id,
            body.replacement_vehicle_id,
            body.reason,
            Utc::now(),
        )?;
        let guest_email = bookings.get(&id).map(|b| b.guest_email.clone());
        (token, guest_email)
    };

    // Guest consent email goes out after the transition committed; a delivery
    // failure is logged and never rolls the reassignment back.
    if let Some(guest_email) = guest_email {
        notify::dispatch(
            state.notifier.clone(),
            Notification::ReassignmentConsent {
                guest_email,
                token: token.token.clone(),
                event: ReassignmentInitiatedEvent {
                    booking_id: id,
                    replacement_vehicle_id: token.replacement_vehicle_id,
                    token_expires_at: token.expires_at,
                },
            },
        );
    }

    Ok(Json(token))
}

async fn consume_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ConsumeResponse>, ApiError> {
    let (booking_id, vehicle_id, guest_email) = {
        let fleet = state.fleet.read().await;
        let mut bookings = state.bookings.write().await;
        let mut coordinator = state.reassignments.write().await;

        let booking_id = coordinator.consume(&mut bookings, &fleet, &token, Utc::now())?;
        let booking = bookings
            .get(&booking_id)
            .ok_or_else(|| ApiError::NotFound(format!("booking {}", booking_id)))?;
        (booking_id, booking.vehicle_id, booking.guest_email.clone())
    };

    notify::dispatch(
        state.notifier.clone(),
        Notification::VehicleReassigned {
            guest_email,
            event: VehicleReassignedEvent {
                booking_id,
                vehicle_id,
            },
        },
    );

    Ok(Json(ConsumeResponse {
        booking_id,
        vehicle_id,
    }))
}
