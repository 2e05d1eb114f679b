use thiserror::Error;

// Domain-level errors surfaced to the HTTP layer. Validation outcomes that
// the original clients expect as `success: false` payloads are not errors;
// those travel inside BasicResponse / DataResponse instead.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User with id {0} not found")]
    UserNotFound(i32),
    #[error("Venue with id {0} not found")]
    VenueNotFound(i32),
    #[error("Venue type with id {0} not found")]
    VenueTypeNotFound(i32),
    #[error("Reservation with id {0} not found")]
    ReservationNotFound(i32),
    #[error("Unsupported venue category.")]
    UnsupportedCategory,
    #[error("{0}")]
    InvalidImage(String),
    #[error("storage error: {0}")]
    Storage(String),
}
