use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::entities::{
    NewReservation, NewUser, NewVenue, NewVenueRating, NotificationOptionsEntity, Page,
    PageRequest, ReservationEntity, StoredImage, UserEntity, VenueEntity, VenueRatingEntity,
    VenueReservationCount, VenueTypeEntity,
};

// Optional filters for the unscoped venue listing.
#[derive(Clone, Debug, Default)]
pub struct VenueFilter {
    pub search_query: Option<String>,
    pub type_ids: Option<Vec<i32>>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, String>;
    async fn find_by_id(&self, id: i32) -> Result<Option<UserEntity>, String>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<UserEntity>, String>;
    async fn insert(&self, user: &NewUser) -> Result<UserEntity, String>;
    async fn save(&self, user: &UserEntity) -> Result<(), String>;
    async fn delete(&self, id: i32) -> Result<(), String>;
}

#[async_trait]
pub trait NotificationOptionsStore: Send + Sync {
    async fn find_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Option<NotificationOptionsEntity>, String>;
    // Creates the per-user row with every channel switched off.
    async fn insert_defaults(&self, user_id: i32) -> Result<NotificationOptionsEntity, String>;
    async fn save(&self, options: &NotificationOptionsEntity) -> Result<(), String>;
}

#[async_trait]
pub trait VenueStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<VenueEntity>, String>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<VenueEntity>, String>;
    async fn find_page(
        &self,
        page: PageRequest,
        filter: &VenueFilter,
    ) -> Result<Page<VenueEntity>, String>;
    // All venues, newest first.
    async fn find_newest(&self, page: PageRequest) -> Result<Page<VenueEntity>, String>;
    // Rating above 4.0 with spare capacity, ordered id desc, rating desc,
    // capacity desc.
    async fn find_suggested(&self, page: PageRequest) -> Result<Page<VenueEntity>, String>;
    async fn find_by_locations(
        &self,
        locations: &[String],
        page: PageRequest,
    ) -> Result<Page<VenueEntity>, String>;
    async fn find_by_owner(
        &self,
        owner_id: i32,
        page: PageRequest,
    ) -> Result<Page<VenueEntity>, String>;
    async fn find_all_by_owner(&self, owner_id: i32) -> Result<Vec<VenueEntity>, String>;
    async fn find_by_owner_and_name(
        &self,
        owner_id: i32,
        name: &str,
    ) -> Result<Option<VenueEntity>, String>;
    async fn count_by_owner(&self, owner_id: i32) -> Result<i64, String>;
    async fn insert(&self, venue: &NewVenue) -> Result<i32, String>;
    async fn save(&self, venue: &VenueEntity) -> Result<(), String>;
    async fn delete(&self, id: i32) -> Result<(), String>;
}

#[async_trait]
pub trait WorkingDaysStore: Send + Sync {
    // Days as Monday-based indices 0..=6.
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<i32>, String>;
    // (venue_id, day_of_week) pairs for a batch of venues.
    async fn find_by_venue_ids(&self, venue_ids: &[i32]) -> Result<Vec<(i32, i32)>, String>;
    async fn replace_for_venue(&self, venue_id: i32, days: &[i32]) -> Result<(), String>;
}

#[async_trait]
pub trait VenueRatingStore: Send + Sync {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<VenueRatingEntity>, String>;
    async fn find_by_venue_ids(
        &self,
        venue_ids: &[i32],
    ) -> Result<Vec<VenueRatingEntity>, String>;
    async fn count_by_venue_ids(&self, venue_ids: &[i32]) -> Result<i64, String>;
    async fn insert(&self, rating: &NewVenueRating) -> Result<(), String>;
}

#[async_trait]
pub trait VenueTypeStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<VenueTypeEntity>, String>;
    async fn find_all(&self) -> Result<Vec<VenueTypeEntity>, String>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<ReservationEntity>, String>;
    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<ReservationEntity>, String>;
    async fn find_by_venue_ids(&self, venue_ids: &[i32])
        -> Result<Vec<ReservationEntity>, String>;
    async fn find_in_window_for_venues(
        &self,
        venue_ids: &[i32],
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ReservationEntity>, String>;
    async fn count_by_venue_ids(&self, venue_ids: &[i32]) -> Result<i64, String>;
    async fn top_venues_by_reservations(
        &self,
        page: PageRequest,
    ) -> Result<Page<VenueReservationCount>, String>;
    // Checks the guest total in the window and inserts in one transaction;
    // returns false when the party no longer fits.
    async fn insert_if_capacity(
        &self,
        reservation: &NewReservation,
        from: NaiveDateTime,
        until: NaiveDateTime,
        maximum_capacity: i32,
    ) -> Result<bool, String>;
    async fn save(&self, reservation: &ReservationEntity) -> Result<(), String>;
    async fn delete(&self, id: i32) -> Result<(), String>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<StoredImage>, String>;
    async fn insert(&self, venue_id: i32, name: &str, data: &[u8]) -> Result<(), String>;
}

// Outbound geolocation lookups. Implementations own their fallbacks so the
// venue listing never fails because a lookup provider is down.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    async fn current_city(&self, latitude: f64, longitude: f64) -> String;
    async fn nearby_cities(&self, latitude: f64, longitude: f64) -> Vec<String>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

// Port for retrieving the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
