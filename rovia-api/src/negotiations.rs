use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use rovia_domain::events::InvitationUpdatedEvent;
use rovia_domain::{ManagementInvitation, PartyRole, RevenueSplit};
use rovia_terms::{ActorIdentity, NewInvitation};
use serde::Deserialize;

use crate::error::ApiError;
use crate::notify::{self, Notification};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CounterBody {
    actor: ActorIdentity,
    owner_percent: u8,
    manager_percent: u8,
    note: Option<String>,
    /// Optimistic guard: the round the caller based this counter on.
    expected_round: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct AcceptBody {
    actor: ActorIdentity,
}

#[derive(Debug, Deserialize)]
struct DeclineBody {
    actor: ActorIdentity,
    reason: Option<String>,
}

/// The party that did not make the latest offer is the one waiting on news.
fn counterparty_email(invitation: &ManagementInvitation) -> Option<String> {
    match invitation.last_offer_by() {
        PartyRole::Sender => invitation.recipient.email.clone(),
        PartyRole::Recipient => invitation.sender.email.clone(),
    }
}

fn progress_notification(invitation: &ManagementInvitation) -> Notification {
    Notification::InvitationProgress {
        counterparty_email: counterparty_email(invitation),
        event: InvitationUpdatedEvent {
            invitation_id: invitation.id,
            status: invitation.status,
            negotiation_rounds: invitation.negotiation_rounds,
        },
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/invitations", post(send_invitation))
        .route("/v1/invitations/{token}", get(get_invitation))
        .route("/v1/invitations/{token}/terms", get(get_current_terms))
        .route("/v1/invitations/{token}/counter", post(counter_offer))
        .route("/v1/invitations/{token}/accept", post(accept_invitation))
        .route("/v1/invitations/{token}/decline", post(decline_invitation))
}

async fn send_invitation(
    State(state): State<AppState>,
    Json(body): Json<NewInvitation>,
) -> Result<Json<ManagementInvitation>, ApiError> {
    let valid_for = Duration::days(state.rules.invitation_validity_days as i64);
    let invitation = state
        .negotiations
        .write()
        .await
        .send(body, valid_for, Utc::now())?;

    notify::dispatch(
        state.notifier.clone(),
        Notification::InvitationDelivery {
            recipient_email: invitation.recipient.email.clone(),
            token: invitation.token.clone(),
        },
    );

    Ok(Json(invitation))
}

async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ManagementInvitation>, ApiError> {
    let mut engine = state.negotiations.write().await;
    let invitation = engine.get(&token, Utc::now())?;
    Ok(Json(invitation.clone()))
}

async fn get_current_terms(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<RevenueSplit>, ApiError> {
    let mut engine = state.negotiations.write().await;
    let invitation = engine.get(&token, Utc::now())?;
    Ok(Json(invitation.current_terms()))
}

async fn counter_offer(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<CounterBody>,
) -> Result<Json<ManagementInvitation>, ApiError> {
    let split = RevenueSplit {
        owner_percent: body.owner_percent,
        manager_percent: body.manager_percent,
    };
    let invitation = state.negotiations.write().await.counter(
        &token,
        &body.actor,
        split,
        body.note,
        body.expected_round,
        Utc::now(),
    )?;

    notify::dispatch(state.notifier.clone(), progress_notification(&invitation));
    Ok(Json(invitation))
}

async fn accept_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<AcceptBody>,
) -> Result<Json<ManagementInvitation>, ApiError> {
    let invitation = state
        .negotiations
        .write()
        .await
        .accept(&token, &body.actor, Utc::now())?;

    notify::dispatch(state.notifier.clone(), progress_notification(&invitation));
    Ok(Json(invitation))
}

async fn decline_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<DeclineBody>,
) -> Result<Json<ManagementInvitation>, ApiError> {
    let invitation = state.negotiations.write().await.decline(
        &token,
        &body.actor,
        body.reason,
        Utc::now(),
    )?;

    notify::dispatch(state.notifier.clone(), progress_notification(&invitation));
    Ok(Json(invitation))
}
