use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::domain::entities::PageRequest;
use crate::domain::errors::DomainError;
use crate::interface_adapters::handlers::{error_response, parse_id_list, ApiError};
use crate::interface_adapters::protocol::{
    BasicResponse, CreateVenueRequest, DataResponse, PagedResponse, UpdateVenueRequest, Venue,
    VenueRating, VenueType,
};
use crate::interface_adapters::repos::{
    PostgresImageStore, PostgresReservationStore, PostgresUserStore, PostgresVenueRatingStore,
    PostgresVenueStore, PostgresVenueTypeStore, PostgresWorkingDaysStore,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::image::{ImageService, ImageUpload};
use crate::use_cases::venue::VenueService;

type Venues = VenueService<
    PostgresVenueStore,
    PostgresWorkingDaysStore,
    PostgresVenueRatingStore,
    PostgresVenueTypeStore,
    PostgresUserStore,
    PostgresReservationStore,
    SystemClock,
>;

fn service(state: &AppState) -> Venues {
    VenueService {
        venues: PostgresVenueStore {
            db: state.db.clone(),
        },
        working_days: PostgresWorkingDaysStore {
            db: state.db.clone(),
        },
        ratings: PostgresVenueRatingStore {
            db: state.db.clone(),
        },
        types: PostgresVenueTypeStore {
            db: state.db.clone(),
        },
        users: PostgresUserStore {
            db: state.db.clone(),
        },
        reservations: PostgresReservationStore {
            db: state.db.clone(),
        },
        clock: SystemClock,
        geo: state.geo.clone(),
    }
}

fn images(state: &AppState) -> ImageService<PostgresImageStore, PostgresImageStore> {
    ImageService {
        venue_images: PostgresImageStore::venue_images(state.db.clone()),
        menu_images: PostgresImageStore::menu_images(state.db.clone()),
    }
}

fn default_page_size() -> i64 {
    20
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueListParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
    pub category: Option<String>,
    pub search_query: Option<String>,
    pub type_ids: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub async fn get_venues(
    State(state): State<AppState>,
    Query(params): Query<VenueListParams>,
) -> Result<Json<PagedResponse<Venue>>, ApiError> {
    let service = service(&state);
    let page = PageRequest::new(params.page, params.size);

    let result = match params.category.as_deref().map(str::to_lowercase).as_deref() {
        Some("nearby") => {
            service
                .get_nearby(page, params.latitude, params.longitude)
                .await
        }
        Some("new") => service.get_new(page).await,
        Some("trending") => service.get_trending(page).await,
        Some("suggested") => service.get_suggested(page).await,
        Some(_) => Err(DomainError::UnsupportedCategory),
        None => {
            let type_ids = params.type_ids.as_deref().map(parse_id_list);
            service.get_all(page, params.search_query, type_ids).await
        }
    };

    result.map(Json).map_err(error_response)
}

pub async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<Venue>, ApiError> {
    service(&state)
        .get(venue_id)
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

pub async fn get_venues_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
    Query(params): Query<PageParams>,
) -> Result<Json<PagedResponse<Venue>>, ApiError> {
    service(&state)
        .get_by_owner(owner_id, PageRequest::new(params.page, params.size))
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_venue_count_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
) -> Result<Json<i64>, ApiError> {
    service(&state)
        .get_count_by_owner(owner_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_venue_type(
    State(state): State<AppState>,
    Path(type_id): Path<i32>,
) -> Result<Json<String>, ApiError> {
    service(&state)
        .get_type(type_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_all_venue_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<VenueType>>, ApiError> {
    service(&state)
        .get_all_types()
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_average_rating(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<f64>, ApiError> {
    service(&state)
        .get_average_rating(venue_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_all_ratings(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<Vec<VenueRating>>, ApiError> {
    service(&state)
        .get_all_ratings(venue_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_overall_rating(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
) -> Result<Json<f64>, ApiError> {
    service(&state)
        .get_overall_rating(owner_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_ratings_count(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
) -> Result<Json<i64>, ApiError> {
    service(&state)
        .get_ratings_count(owner_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_utilisation_rate(
    State(state): State<AppState>,
    Path(owner_id): Path<i32>,
) -> Result<Json<f64>, ApiError> {
    service(&state)
        .get_utilisation_rate(owner_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_venue(
    State(state): State<AppState>,
    Json(request): Json<CreateVenueRequest>,
) -> Json<DataResponse<i32>> {
    Json(service(&state).create(request).await)
}

pub async fn update_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
    request: Option<Json<UpdateVenueRequest>>,
) -> Result<Json<BasicResponse>, ApiError> {
    service(&state)
        .update(venue_id, request.map(|Json(request)| request))
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateParams {
    pub rating: f64,
    pub user_id: i32,
    pub comment: Option<String>,
}

pub async fn rate_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
    Query(params): Query<RateParams>,
) -> Result<Json<BasicResponse>, ApiError> {
    service(&state)
        .rate(venue_id, params.rating, params.user_id, params.comment)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Json<BasicResponse> {
    Json(service(&state).delete(venue_id).await)
}

pub async fn get_header_image(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<DataResponse<String>>, ApiError> {
    images(&state)
        .get_header_image(venue_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_venue_images(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<Vec<String>>, ApiError> {
    images(&state)
        .get_venue_images(venue_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_menu_images(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
) -> Result<Json<Vec<String>>, ApiError> {
    images(&state)
        .get_menu_images(venue_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn upload_venue_image(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<BasicResponse>, ApiError> {
    let upload = extract_image(multipart).await?;
    images(&state)
        .upload_venue_image(venue_id, &upload)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn upload_menu_image(
    State(state): State<AppState>,
    Path(venue_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<BasicResponse>, ApiError> {
    let upload = extract_image(multipart).await?;
    images(&state)
        .upload_menu_image(venue_id, &upload)
        .await
        .map(Json)
        .map_err(error_response)
}

// Pulls the "image" part out of the multipart form.
async fn extract_image(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| error_response(DomainError::InvalidImage(err.to_string())))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| error_response(DomainError::InvalidImage(err.to_string())))?;

        return Ok(ImageUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(error_response(DomainError::InvalidImage(
        "Image file is missing".to_string(),
    )))
}
