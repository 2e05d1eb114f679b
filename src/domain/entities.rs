use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Account roles stored as role_id on the users table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Owner,
}

impl Role {
    pub fn from_id(id: i32) -> Role {
        match id {
            1 => Role::Owner,
            _ => Role::Customer,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Role::Customer => 0,
            Role::Owner => 1,
        }
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct UserEntity {
    pub id: i32,
    pub username: String,
    pub email: String,
    // Bcrypt hash, never the plaintext password.
    pub password: String,
    pub last_known_latitude: Option<f64>,
    pub last_known_longitude: Option<f64>,
    pub role_id: i32,
}

// Insert payload for users; the id is assigned by the store.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: i32,
}

#[derive(Clone, Debug, FromRow)]
pub struct NotificationOptionsEntity {
    pub id: i32,
    pub user_id: i32,
    pub push_notifications_enabled: bool,
    pub email_notifications_enabled: bool,
    pub location_services_enabled: bool,
}

#[derive(Clone, Debug, FromRow)]
pub struct VenueEntity {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub location: String,
    pub working_hours: String,
    pub maximum_capacity: i32,
    pub available_capacity: i32,
    // Denormalized mean of the venue's rating rows.
    pub average_rating: f64,
    pub venue_type_id: i32,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewVenue {
    pub owner_id: i32,
    pub name: String,
    pub location: String,
    pub working_hours: String,
    pub maximum_capacity: i32,
    pub available_capacity: i32,
    pub venue_type_id: i32,
    pub description: Option<String>,
}

#[derive(Clone, Debug, FromRow)]
pub struct VenueTypeEntity {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, FromRow)]
pub struct VenueRatingEntity {
    pub id: i32,
    pub venue_id: i32,
    pub rating: f64,
    pub username: String,
    pub comment: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewVenueRating {
    pub venue_id: i32,
    pub rating: f64,
    pub username: String,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, FromRow)]
pub struct ReservationEntity {
    pub id: i32,
    pub user_id: i32,
    pub venue_id: i32,
    pub datetime: NaiveDateTime,
    pub number_of_guests: i32,
}

#[derive(Clone, Debug)]
pub struct NewReservation {
    pub user_id: i32,
    pub venue_id: i32,
    pub datetime: NaiveDateTime,
    pub number_of_guests: i32,
}

// Compressed image blob as stored; decompression happens in the image service.
#[derive(Clone, Debug, FromRow)]
pub struct StoredImage {
    pub id: i32,
    pub venue_id: i32,
    pub name: String,
    pub image_data: Vec<u8>,
}

// Reservation count per venue, used for the trending listing.
#[derive(Clone, Debug, FromRow)]
pub struct VenueReservationCount {
    pub venue_id: i32,
    pub reservation_count: i64,
}

// Zero-indexed page request for listing queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(0),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

// One page of store results together with the unpaged total.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}
