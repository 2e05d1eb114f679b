use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    NotificationOptionsEntity, PageRequest, ReservationEntity, Role, UserEntity,
    VenueRatingEntity, VenueTypeEntity,
};

// Simple status envelope for mutating operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BasicResponse {
    pub success: bool,
    pub message: String,
}

impl BasicResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// Status envelope carrying a payload on success.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> DataResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PagedResponse<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: (total_elements + request.size - 1) / request.size,
        }
    }
}

// Error envelope for non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub is_push_notifications_enabled: bool,
    pub is_email_notifications_enabled: bool,
    pub is_location_services_enabled: bool,
}

impl From<&NotificationOptionsEntity> for NotificationOptions {
    fn from(entity: &NotificationOptionsEntity) -> Self {
        Self {
            is_push_notifications_enabled: entity.push_notifications_enabled,
            is_email_notifications_enabled: entity.email_notifications_enabled,
            is_location_services_enabled: entity.location_services_enabled,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub notification_options: Option<NotificationOptions>,
    pub role: Role,
    pub last_known_latitude: Option<f64>,
    pub last_known_longitude: Option<f64>,
}

impl User {
    pub fn from_entity(entity: &UserEntity, options: Option<&NotificationOptionsEntity>) -> Self {
        Self {
            id: entity.id,
            username: entity.username.clone(),
            email: entity.email.clone(),
            notification_options: options.map(NotificationOptions::from),
            role: Role::from_id(entity.role_id),
            last_known_latitude: entity.last_known_latitude,
            last_known_longitude: entity.last_known_longitude,
        }
    }
}

// Venue view with the rating and capacity recomputed for the current
// half-hour window.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub working_days: Vec<i32>,
    pub working_hours: String,
    pub maximum_capacity: i32,
    pub available_capacity: i32,
    pub average_rating: f64,
    pub venue_type_id: i32,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueRating {
    pub id: i32,
    pub venue_id: i32,
    pub rating: f64,
    pub username: String,
    pub comment: Option<String>,
}

impl From<&VenueRatingEntity> for VenueRating {
    fn from(entity: &VenueRatingEntity) -> Self {
        Self {
            id: entity.id,
            venue_id: entity.venue_id,
            rating: entity.rating,
            username: entity.username.clone(),
            comment: entity.comment.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueType {
    pub id: i32,
    #[serde(rename = "type")]
    pub name: String,
}

impl From<&VenueTypeEntity> for VenueType {
    fn from(entity: &VenueTypeEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub venue_id: i32,
    pub datetime: NaiveDateTime,
    pub number_of_guests: i32,
}

impl From<&ReservationEntity> for Reservation {
    fn from(entity: &ReservationEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            venue_id: entity.venue_id,
            datetime: entity.datetime,
            number_of_guests: entity.number_of_guests,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenueRequest {
    pub owner_id: i32,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub type_id: i32,
    pub working_hours: String,
    pub working_days: Vec<i32>,
    pub maximum_capacity: i32,
    pub available_capacity: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub type_id: Option<i32>,
    pub working_days: Option<Vec<i32>>,
    pub working_hours: Option<String>,
    pub maximum_capacity: Option<i32>,
}

impl UpdateVenueRequest {
    // An empty working-days list is treated the same as an absent one.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.type_id.is_none()
            && self.working_days.as_ref().map_or(true, |days| days.is_empty())
            && self.working_hours.is_none()
            && self.maximum_capacity.is_none()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub user_id: i32,
    pub venue_id: i32,
    pub reservation_date: NaiveDateTime,
    pub number_of_people: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub reservation_date: Option<NaiveDateTime>,
    pub number_of_people: Option<i32>,
}
