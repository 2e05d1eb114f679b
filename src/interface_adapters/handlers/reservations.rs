use axum::extract::{Path, State};
use axum::Json;

use crate::interface_adapters::handlers::{error_response, ApiError};
use crate::interface_adapters::protocol::{
    BasicResponse, CreateReservationRequest, Reservation, UpdateReservationRequest,
};
use crate::interface_adapters::repos::{
    PostgresReservationStore, PostgresUserStore, PostgresVenueStore, PostgresWorkingDaysStore,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::reservation::ReservationService;

type Reservations = ReservationService<
    PostgresReservationStore,
    PostgresUserStore,
    PostgresVenueStore,
    PostgresWorkingDaysStore,
>;

fn service(state: &AppState) -> Reservations {
    ReservationService {
        reservations: PostgresReservationStore {
            db: state.db.clone(),
        },
        users: PostgresUserStore {
            db: state.db.clone(),
        },
        venues: PostgresVenueStore {
            db: state.db.clone(),
        },
        working_days: PostgresWorkingDaysStore {
            db: state.db.clone(),
        },
    }
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<Json<BasicResponse>, ApiError> {
    service(&state)
        .create(request)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i32>,
    request: Option<Json<UpdateReservationRequest>>,
) -> Result<Json<BasicResponse>, ApiError> {
    service(&state)
        .update(reservation_id, request.map(|Json(request)| request))
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i32>,
) -> Result<Json<BasicResponse>, ApiError> {
    service(&state)
        .delete(reservation_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_user_reservations(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    service(&state)
        .get_by_user(user_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_owner_reservations(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    service(&state)
        .get_by_owner(owner_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_owner_reservation_count(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
) -> Result<Json<i64>, ApiError> {
    service(&state)
        .get_count(owner_id)
        .await
        .map(Json)
        .map_err(error_response)
}
