use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::interface_adapters::handlers::{error_response, parse_id_list, ApiError};
use crate::interface_adapters::protocol::{BasicResponse, DataResponse, NotificationOptions, User};
use crate::interface_adapters::repos::{PostgresNotificationOptionsStore, PostgresUserStore};
use crate::interface_adapters::state::AppState;
use crate::use_cases::user::UserService;

fn service(state: &AppState) -> UserService<PostgresUserStore, PostgresNotificationOptionsStore> {
    UserService {
        users: PostgresUserStore {
            db: state.db.clone(),
        },
        options: PostgresNotificationOptionsStore {
            db: state.db.clone(),
        },
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupParams {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_owner: bool,
}

pub async fn signup(
    State(state): State<AppState>,
    Query(params): Query<SignupParams>,
) -> Json<DataResponse<i32>> {
    Json(
        service(&state)
            .signup(&params.email, &params.username, &params.password, params.is_owner)
            .await,
    )
}

#[derive(Deserialize)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Json<DataResponse<i32>> {
    Json(service(&state).login(&params.email, &params.password).await)
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, ApiError> {
    service(&state)
        .get(user_id)
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize)]
pub struct IdListParams {
    pub ids: String,
}

pub async fn get_users_by_ids(
    State(state): State<AppState>,
    Query(params): Query<IdListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    let ids = parse_id_list(&params.ids);
    service(&state)
        .get_by_ids(&ids)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_notification_options(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<NotificationOptions>, ApiError> {
    service(&state)
        .notification_options(user_id)
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationParams {
    pub is_push_notifications_enabled: bool,
    pub is_email_notifications_enabled: bool,
    pub is_location_services_enabled: bool,
}

pub async fn update_notification_options(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(params): Query<NotificationParams>,
) -> Json<BasicResponse> {
    Json(
        service(&state)
            .update_notification_options(
                user_id,
                params.is_push_notifications_enabled,
                params.is_email_notifications_enabled,
                params.is_location_services_enabled,
            )
            .await,
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailParams {
    pub new_email: String,
}

pub async fn update_email(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(params): Query<EmailParams>,
) -> Json<BasicResponse> {
    Json(service(&state).update_email(user_id, &params.new_email).await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameParams {
    pub new_username: String,
}

pub async fn update_username(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(params): Query<UsernameParams>,
) -> Json<BasicResponse> {
    Json(
        service(&state)
            .update_username(user_id, &params.new_username)
            .await,
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordParams {
    pub new_password: String,
}

pub async fn update_password(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(params): Query<PasswordParams>,
) -> Json<BasicResponse> {
    Json(
        service(&state)
            .update_password(user_id, &params.new_password)
            .await,
    )
}

#[derive(Deserialize)]
pub struct LocationParams {
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn update_location(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(params): Query<LocationParams>,
) -> Json<BasicResponse> {
    Json(
        service(&state)
            .update_location(user_id, params.latitude, params.longitude)
            .await,
    )
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Json<BasicResponse> {
    Json(service(&state).delete(user_id).await)
}
