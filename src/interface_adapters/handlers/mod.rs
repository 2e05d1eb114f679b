use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use crate::domain::errors::DomainError;
use crate::interface_adapters::protocol::ErrorResponse;

pub mod geolocation;
pub mod reservations;
pub mod support;
pub mod users;
pub mod venues;

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

// Maps domain failures onto HTTP statuses; storage failures are logged here
// since the envelope hides the cause from the client.
pub(crate) fn error_response(err: DomainError) -> ApiError {
    let status = match &err {
        DomainError::UserNotFound(_)
        | DomainError::VenueNotFound(_)
        | DomainError::VenueTypeNotFound(_)
        | DomainError::ReservationNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::UnsupportedCategory | DomainError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "request failed");
    }

    (
        status,
        Json(ErrorResponse {
            message: err.to_string(),
        }),
    )
}

// "1,2,3" style id lists, as sent for batch lookups and type filters.
pub(crate) fn parse_id_list(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
