use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use rovia_domain::CommissionAuditEntry;
use rovia_terms::{
    initial_rate_for_fleet, resolve, CommissionTerms, CommissionTier, EligibilityOutcome,
    EligibilityPolicy, HostActivity, MonetizationPath,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CommissionSelectionBody {
    path: MonetizationPath,
    tier: Option<CommissionTier>,
    actor: String,
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommissionSelectionResponse {
    terms: CommissionTerms,
    audit_entry_id: Uuid,
}

#[derive(Debug, Serialize)]
struct InitialRateResponse {
    fleet_size: usize,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct DepositBody {
    amount_dollars: i32,
}

#[derive(Debug, Serialize)]
struct DepositResponse {
    amount_dollars: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/hosts/{id}/commission", post(select_commission))
        .route("/v1/hosts/{id}/commission/audit", get(commission_audit))
        .route("/v1/hosts/{id}/commission/initial", get(initial_commission))
        .route("/v1/hosts/{id}/loss-wage-eligibility", post(loss_wage_eligibility))
        .route("/v1/deposits/default", put(set_default_deposit))
        .route("/v1/deposits/makes/{make}", put(set_make_deposit))
        .route("/v1/vehicles/{id}/deposit", get(vehicle_deposit))
}

/// Resolve the declared path/tier and record the change. The resolution is
/// pure; the audit row is the separate, explicit side effect.
async fn select_commission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CommissionSelectionBody>,
) -> Result<Json<CommissionSelectionResponse>, ApiError> {
    let terms = resolve(body.path, body.tier)?;

    let fallback_rate = {
        let fleet = state.fleet.read().await;
        initial_rate_for_fleet(fleet.fleet_size(&id))
    };

    let mut ledger = state.commissions.write().await;
    let old_rate = ledger.current_rate(&id).unwrap_or(fallback_rate);
    let entry = ledger.record(
        id,
        old_rate,
        terms.rate,
        body.reason.unwrap_or_else(|| "path selection".into()),
        body.actor,
        Utc::now(),
    );

    Ok(Json(CommissionSelectionResponse {
        terms,
        audit_entry_id: entry.id,
    }))
}

async fn commission_audit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommissionAuditEntry>>, ApiError> {
    let ledger = state.commissions.read().await;
    let entries = ledger.entries_for(&id).into_iter().cloned().collect();
    Ok(Json(entries))
}

/// The fleet-size default computed at approval time. Informational only; it
/// never overrides an explicit selection already on the ledger.
async fn initial_commission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InitialRateResponse>, ApiError> {
    let fleet = state.fleet.read().await;
    let fleet_size = fleet.fleet_size(&id);
    Ok(Json(InitialRateResponse {
        fleet_size,
        rate: initial_rate_for_fleet(fleet_size),
    }))
}

async fn loss_wage_eligibility(
    State(_state): State<AppState>,
    Path(_id): Path<Uuid>,
    Json(activity): Json<HostActivity>,
) -> Result<Json<EligibilityOutcome>, ApiError> {
    let outcome = EligibilityPolicy::loss_wage().evaluate(&activity);
    Ok(Json(outcome))
}

async fn set_default_deposit(
    State(state): State<AppState>,
    Json(body): Json<DepositBody>,
) -> Result<Json<DepositResponse>, ApiError> {
    let amount_dollars = state.deposits.write().await.set_default(body.amount_dollars);
    Ok(Json(DepositResponse { amount_dollars }))
}

async fn set_make_deposit(
    State(state): State<AppState>,
    Path(make): Path<String>,
    Json(body): Json<DepositBody>,
) -> Result<Json<DepositResponse>, ApiError> {
    let amount_dollars = state
        .deposits
        .write()
        .await
        .set_make_override(&make, body.amount_dollars)?;
    Ok(Json(DepositResponse { amount_dollars }))
}

/// Deposit in force for one vehicle: fixed amount, else make override, else
/// the platform default.
async fn vehicle_deposit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DepositResponse>, ApiError> {
    let fleet = state.fleet.read().await;
    let vehicle = fleet
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("vehicle {}", id)))?;
    let amount_dollars = state.deposits.read().await.deposit_for(vehicle);
    Ok(Json(DepositResponse { amount_dollars }))
}
