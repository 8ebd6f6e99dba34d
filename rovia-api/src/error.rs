use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rovia_fleet::{FleetError, LedgerError};
use rovia_match::MatchError;
use rovia_terms::{NegotiationError, TermsError};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    Expired(String),
    Forbidden(String),
    Validation(String),
    RoundsExhausted(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Expired(msg) => (StatusCode::GONE, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::RoundsExhausted(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotFound(msg) => ApiError::NotFound(msg),
            MatchError::Conflict(msg) => ApiError::Conflict(msg),
            MatchError::Expired(msg) => ApiError::Expired(msg),
            MatchError::Forbidden(msg) => ApiError::Forbidden(msg),
            MatchError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<NegotiationError> for ApiError {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::NotFound(msg) => ApiError::NotFound(msg),
            NegotiationError::Conflict(msg) => ApiError::Conflict(msg),
            NegotiationError::Expired(msg) => ApiError::Expired(msg),
            NegotiationError::Forbidden(msg) => ApiError::Forbidden(msg),
            NegotiationError::Validation(msg) => ApiError::Validation(msg),
            NegotiationError::RoundsExhausted(msg) => ApiError::RoundsExhausted(msg),
        }
    }
}

impl From<TermsError> for ApiError {
    fn from(err: TermsError) -> Self {
        match err {
            TermsError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        match err {
            FleetError::NotFound(msg) => ApiError::NotFound(msg),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(msg) => ApiError::NotFound(msg),
            LedgerError::AlreadyReviewed(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}
