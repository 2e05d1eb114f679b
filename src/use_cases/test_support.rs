use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::entities::{
    NewReservation, NewUser, NewVenue, NewVenueRating, NotificationOptionsEntity, Page,
    PageRequest, ReservationEntity, StoredImage, UserEntity, VenueEntity, VenueRatingEntity,
    VenueReservationCount, VenueTypeEntity,
};
use crate::domain::ports::{
    Clock, GeoProvider, ImageStore, Mailer, NotificationOptionsStore, ReservationStore, UserStore,
    VenueFilter, VenueRatingStore, VenueStore, VenueTypeStore, WorkingDaysStore,
};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub(crate) fn at(hour: u32, minute: u32) -> NaiveDateTime {
    // A Saturday, day index 5.
    NaiveDate::from_ymd_opt(2025, 8, 2)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub find: bool,
    pub insert: bool,
    pub save: bool,
    pub delete: bool,
}

impl FailureFlags {
    pub(crate) fn failing_insert() -> Self {
        Self {
            insert: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_save() -> Self {
        Self {
            save: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_delete() -> Self {
        Self {
            delete: true,
            ..Self::default()
        }
    }

    fn check(&self, flag: bool, operation: &str) -> Result<(), String> {
        if flag {
            Err(format!("{operation} failed"))
        } else {
            Ok(())
        }
    }
}

// Entity builders with the defaults most tests want.

pub(crate) fn customer(id: i32) -> UserEntity {
    UserEntity {
        id,
        username: format!("customer{id}"),
        email: format!("customer{id}@test.com"),
        password: "hash".to_string(),
        last_known_latitude: None,
        last_known_longitude: None,
        role_id: 0,
    }
}

pub(crate) fn owner(id: i32) -> UserEntity {
    UserEntity {
        role_id: 1,
        ..customer(id)
    }
}

pub(crate) fn venue(id: i32, owner_id: i32) -> VenueEntity {
    VenueEntity {
        id,
        owner_id,
        name: format!("Venue {id}"),
        location: "Zagreb".to_string(),
        working_hours: "09:00 - 17:00".to_string(),
        maximum_capacity: 20,
        available_capacity: 20,
        average_rating: 0.0,
        venue_type_id: 1,
        description: None,
    }
}

pub(crate) fn rating(id: i32, venue_id: i32, value: f64) -> VenueRatingEntity {
    VenueRatingEntity {
        id,
        venue_id,
        rating: value,
        username: "rater".to_string(),
        comment: None,
    }
}

pub(crate) fn reservation(
    id: i32,
    user_id: i32,
    venue_id: i32,
    datetime: NaiveDateTime,
    guests: i32,
) -> ReservationEntity {
    ReservationEntity {
        id,
        user_id,
        venue_id,
        datetime,
        number_of_guests: guests,
    }
}

pub(crate) fn options(user_id: i32) -> NotificationOptionsEntity {
    NotificationOptionsEntity {
        id: user_id,
        user_id,
        push_notifications_enabled: false,
        email_notifications_enabled: false,
        location_services_enabled: false,
    }
}

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.size as usize)
        .cloned()
        .collect();
    Page { items, total }
}

#[derive(Clone)]
pub(crate) struct RecordingUsers {
    users: Arc<Mutex<Vec<UserEntity>>>,
    failures: FailureFlags,
}

impl RecordingUsers {
    pub(crate) fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_users(users: Vec<UserEntity>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn get(&self, id: i32) -> Option<UserEntity> {
        let guard = self.users.lock().expect("users mutex poisoned");
        guard.iter().find(|user| user.id == id).cloned()
    }

    pub(crate) fn all(&self) -> Vec<UserEntity> {
        self.users.lock().expect("users mutex poisoned").clone()
    }
}

#[async_trait]
impl UserStore for RecordingUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let guard = self.users.lock().expect("users mutex poisoned");
        Ok(guard.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.get(id))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<UserEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let guard = self.users.lock().expect("users mutex poisoned");
        Ok(guard
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, user: &NewUser) -> Result<UserEntity, String> {
        self.failures.check(self.failures.insert, "insert")?;
        let mut guard = self.users.lock().expect("users mutex poisoned");
        let id = guard.iter().map(|user| user.id).max().unwrap_or(0) + 1;
        let entity = UserEntity {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            last_known_latitude: None,
            last_known_longitude: None,
            role_id: user.role_id,
        };
        guard.push(entity.clone());
        Ok(entity)
    }

    async fn save(&self, user: &UserEntity) -> Result<(), String> {
        self.failures.check(self.failures.save, "save")?;
        let mut guard = self.users.lock().expect("users mutex poisoned");
        if let Some(slot) = guard.iter_mut().find(|existing| existing.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), String> {
        self.failures.check(self.failures.delete, "delete")?;
        let mut guard = self.users.lock().expect("users mutex poisoned");
        guard.retain(|user| user.id != id);
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingOptions {
    options: Arc<Mutex<Vec<NotificationOptionsEntity>>>,
    failures: FailureFlags,
}

impl RecordingOptions {
    pub(crate) fn new() -> Self {
        Self {
            options: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_options(options: Vec<NotificationOptionsEntity>) -> Self {
        Self {
            options: Arc::new(Mutex::new(options)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn get(&self, user_id: i32) -> Option<NotificationOptionsEntity> {
        let guard = self.options.lock().expect("options mutex poisoned");
        guard.iter().find(|entry| entry.user_id == user_id).cloned()
    }
}

#[async_trait]
impl NotificationOptionsStore for RecordingOptions {
    async fn find_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Option<NotificationOptionsEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.get(user_id))
    }

    async fn insert_defaults(&self, user_id: i32) -> Result<NotificationOptionsEntity, String> {
        self.failures.check(self.failures.insert, "insert")?;
        let mut guard = self.options.lock().expect("options mutex poisoned");
        let entity = NotificationOptionsEntity {
            id: guard.iter().map(|entry| entry.id).max().unwrap_or(0) + 1,
            user_id,
            push_notifications_enabled: false,
            email_notifications_enabled: false,
            location_services_enabled: false,
        };
        guard.push(entity.clone());
        Ok(entity)
    }

    async fn save(&self, options: &NotificationOptionsEntity) -> Result<(), String> {
        self.failures.check(self.failures.save, "save")?;
        let mut guard = self.options.lock().expect("options mutex poisoned");
        if let Some(slot) = guard.iter_mut().find(|entry| entry.id == options.id) {
            *slot = options.clone();
        }
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingVenues {
    venues: Arc<Mutex<Vec<VenueEntity>>>,
    failures: FailureFlags,
}

impl RecordingVenues {
    pub(crate) fn new() -> Self {
        Self {
            venues: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_venues(venues: Vec<VenueEntity>) -> Self {
        Self {
            venues: Arc::new(Mutex::new(venues)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn get(&self, id: i32) -> Option<VenueEntity> {
        let guard = self.venues.lock().expect("venues mutex poisoned");
        guard.iter().find(|venue| venue.id == id).cloned()
    }

    pub(crate) fn all(&self) -> Vec<VenueEntity> {
        self.venues.lock().expect("venues mutex poisoned").clone()
    }
}

#[async_trait]
impl VenueStore for RecordingVenues {
    async fn find_by_id(&self, id: i32) -> Result<Option<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.get(id))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let guard = self.venues.lock().expect("venues mutex poisoned");
        Ok(guard
            .iter()
            .filter(|venue| ids.contains(&venue.id))
            .cloned()
            .collect())
    }

    async fn find_page(
        &self,
        page: PageRequest,
        filter: &VenueFilter,
    ) -> Result<Page<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let guard = self.venues.lock().expect("venues mutex poisoned");
        let filtered: Vec<VenueEntity> = guard
            .iter()
            .filter(|venue| {
                filter.search_query.as_ref().map_or(true, |query| {
                    venue.name.to_lowercase().contains(&query.to_lowercase())
                }) && filter
                    .type_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&venue.venue_type_id))
            })
            .cloned()
            .collect();
        Ok(page_slice(&filtered, page))
    }

    async fn find_newest(&self, page: PageRequest) -> Result<Page<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let mut venues = self.all();
        venues.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_slice(&venues, page))
    }

    async fn find_suggested(&self, page: PageRequest) -> Result<Page<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let mut venues: Vec<VenueEntity> = self
            .all()
            .into_iter()
            .filter(|venue| venue.average_rating > 4.0 && venue.available_capacity > 0)
            .collect();
        venues.sort_by(|a, b| {
            b.id.cmp(&a.id)
                .then(
                    b.average_rating
                        .partial_cmp(&a.average_rating)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(b.available_capacity.cmp(&a.available_capacity))
        });
        Ok(page_slice(&venues, page))
    }

    async fn find_by_locations(
        &self,
        locations: &[String],
        page: PageRequest,
    ) -> Result<Page<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let venues: Vec<VenueEntity> = self
            .all()
            .into_iter()
            .filter(|venue| locations.contains(&venue.location))
            .collect();
        Ok(page_slice(&venues, page))
    }

    async fn find_by_owner(
        &self,
        owner_id: i32,
        page: PageRequest,
    ) -> Result<Page<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        let venues = self.find_all_by_owner(owner_id).await?;
        Ok(page_slice(&venues, page))
    }

    async fn find_all_by_owner(&self, owner_id: i32) -> Result<Vec<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|venue| venue.owner_id == owner_id)
            .collect())
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: i32,
        name: &str,
    ) -> Result<Option<VenueEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .find(|venue| venue.owner_id == owner_id && venue.name == name))
    }

    async fn count_by_owner(&self, owner_id: i32) -> Result<i64, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.find_all_by_owner(owner_id).await?.len() as i64)
    }

    async fn insert(&self, venue: &NewVenue) -> Result<i32, String> {
        self.failures.check(self.failures.insert, "insert")?;
        let mut guard = self.venues.lock().expect("venues mutex poisoned");
        let id = guard.iter().map(|venue| venue.id).max().unwrap_or(0) + 1;
        guard.push(VenueEntity {
            id,
            owner_id: venue.owner_id,
            name: venue.name.clone(),
            location: venue.location.clone(),
            working_hours: venue.working_hours.clone(),
            maximum_capacity: venue.maximum_capacity,
            available_capacity: venue.available_capacity,
            average_rating: 0.0,
            venue_type_id: venue.venue_type_id,
            description: venue.description.clone(),
        });
        Ok(id)
    }

    async fn save(&self, venue: &VenueEntity) -> Result<(), String> {
        self.failures.check(self.failures.save, "save")?;
        let mut guard = self.venues.lock().expect("venues mutex poisoned");
        if let Some(slot) = guard.iter_mut().find(|existing| existing.id == venue.id) {
            *slot = venue.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), String> {
        self.failures.check(self.failures.delete, "delete")?;
        let mut guard = self.venues.lock().expect("venues mutex poisoned");
        guard.retain(|venue| venue.id != id);
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingWorkingDays {
    days: Arc<Mutex<HashMap<i32, Vec<i32>>>>,
    failures: FailureFlags,
}

impl RecordingWorkingDays {
    pub(crate) fn new() -> Self {
        Self {
            days: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_days(entries: Vec<(i32, Vec<i32>)>) -> Self {
        Self {
            days: Arc::new(Mutex::new(entries.into_iter().collect())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn get(&self, venue_id: i32) -> Vec<i32> {
        let guard = self.days.lock().expect("days mutex poisoned");
        guard.get(&venue_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl WorkingDaysStore for RecordingWorkingDays {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<i32>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.get(venue_id))
    }

    async fn find_by_venue_ids(&self, venue_ids: &[i32]) -> Result<Vec<(i32, i32)>, String> {
        self.failures.check(self.failures.find, "find")?;
        let guard = self.days.lock().expect("days mutex poisoned");
        let mut pairs: Vec<(i32, i32)> = venue_ids
            .iter()
            .flat_map(|venue_id| {
                guard
                    .get(venue_id)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|day| (*venue_id, day))
            })
            .collect();
        pairs.sort();
        Ok(pairs)
    }

    async fn replace_for_venue(&self, venue_id: i32, days: &[i32]) -> Result<(), String> {
        self.failures.check(self.failures.save, "save")?;
        let mut guard = self.days.lock().expect("days mutex poisoned");
        guard.insert(venue_id, days.to_vec());
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingRatings {
    ratings: Arc<Mutex<Vec<VenueRatingEntity>>>,
    failures: FailureFlags,
}

impl RecordingRatings {
    pub(crate) fn new() -> Self {
        Self {
            ratings: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_ratings(ratings: Vec<VenueRatingEntity>) -> Self {
        Self {
            ratings: Arc::new(Mutex::new(ratings)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn all(&self) -> Vec<VenueRatingEntity> {
        self.ratings.lock().expect("ratings mutex poisoned").clone()
    }
}

#[async_trait]
impl VenueRatingStore for RecordingRatings {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<VenueRatingEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|entry| entry.venue_id == venue_id)
            .collect())
    }

    async fn find_by_venue_ids(
        &self,
        venue_ids: &[i32],
    ) -> Result<Vec<VenueRatingEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|entry| venue_ids.contains(&entry.venue_id))
            .collect())
    }

    async fn count_by_venue_ids(&self, venue_ids: &[i32]) -> Result<i64, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.find_by_venue_ids(venue_ids).await?.len() as i64)
    }

    async fn insert(&self, rating: &NewVenueRating) -> Result<(), String> {
        self.failures.check(self.failures.insert, "insert")?;
        let mut guard = self.ratings.lock().expect("ratings mutex poisoned");
        let id = guard.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        guard.push(VenueRatingEntity {
            id,
            venue_id: rating.venue_id,
            rating: rating.rating,
            username: rating.username.clone(),
            comment: rating.comment.clone(),
        });
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingTypes {
    types: Arc<Mutex<Vec<VenueTypeEntity>>>,
}

impl RecordingTypes {
    pub(crate) fn with_types(types: Vec<VenueTypeEntity>) -> Self {
        Self {
            types: Arc::new(Mutex::new(types)),
        }
    }

    pub(crate) fn default_types() -> Self {
        Self::with_types(vec![
            VenueTypeEntity {
                id: 1,
                name: "Restaurant".to_string(),
            },
            VenueTypeEntity {
                id: 2,
                name: "Cafe".to_string(),
            },
        ])
    }
}

#[async_trait]
impl VenueTypeStore for RecordingTypes {
    async fn find_by_id(&self, id: i32) -> Result<Option<VenueTypeEntity>, String> {
        let guard = self.types.lock().expect("types mutex poisoned");
        Ok(guard.iter().find(|entry| entry.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<VenueTypeEntity>, String> {
        Ok(self.types.lock().expect("types mutex poisoned").clone())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingReservations {
    reservations: Arc<Mutex<Vec<ReservationEntity>>>,
    failures: FailureFlags,
}

impl RecordingReservations {
    pub(crate) fn new() -> Self {
        Self {
            reservations: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_reservations(reservations: Vec<ReservationEntity>) -> Self {
        Self {
            reservations: Arc::new(Mutex::new(reservations)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn all(&self) -> Vec<ReservationEntity> {
        self.reservations
            .lock()
            .expect("reservations mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl ReservationStore for RecordingReservations {
    async fn find_by_id(&self, id: i32) -> Result<Option<ReservationEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.all().into_iter().find(|entry| entry.id == id))
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<ReservationEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|entry| entry.user_id == user_id)
            .collect())
    }

    async fn find_by_venue_ids(
        &self,
        venue_ids: &[i32],
    ) -> Result<Vec<ReservationEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|entry| venue_ids.contains(&entry.venue_id))
            .collect())
    }

    async fn find_in_window_for_venues(
        &self,
        venue_ids: &[i32],
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ReservationEntity>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|entry| {
                venue_ids.contains(&entry.venue_id)
                    && entry.datetime >= from
                    && entry.datetime < until
            })
            .collect())
    }

    async fn count_by_venue_ids(&self, venue_ids: &[i32]) -> Result<i64, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self.find_by_venue_ids(venue_ids).await?.len() as i64)
    }

    async fn top_venues_by_reservations(
        &self,
        page: PageRequest,
    ) -> Result<Page<VenueReservationCount>, String> {
        self.failures.check(self.failures.find, "find")?;
        let mut counts: HashMap<i32, i64> = HashMap::new();
        for entry in self.all() {
            *counts.entry(entry.venue_id).or_insert(0) += 1;
        }
        let mut stats: Vec<VenueReservationCount> = counts
            .into_iter()
            .map(|(venue_id, reservation_count)| VenueReservationCount {
                venue_id,
                reservation_count,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.reservation_count
                .cmp(&a.reservation_count)
                .then(a.venue_id.cmp(&b.venue_id))
        });
        Ok(page_slice(&stats, page))
    }

    // Mirrors the transactional store path: check and insert under one lock.
    async fn insert_if_capacity(
        &self,
        reservation: &NewReservation,
        from: NaiveDateTime,
        until: NaiveDateTime,
        maximum_capacity: i32,
    ) -> Result<bool, String> {
        self.failures.check(self.failures.insert, "insert")?;
        let mut guard = self
            .reservations
            .lock()
            .expect("reservations mutex poisoned");
        let booked: i32 = guard
            .iter()
            .filter(|entry| {
                entry.venue_id == reservation.venue_id
                    && entry.datetime >= from
                    && entry.datetime < until
            })
            .map(|entry| entry.number_of_guests)
            .sum();
        if booked + reservation.number_of_guests > maximum_capacity {
            return Ok(false);
        }

        let id = guard.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        guard.push(ReservationEntity {
            id,
            user_id: reservation.user_id,
            venue_id: reservation.venue_id,
            datetime: reservation.datetime,
            number_of_guests: reservation.number_of_guests,
        });
        Ok(true)
    }

    async fn save(&self, reservation: &ReservationEntity) -> Result<(), String> {
        self.failures.check(self.failures.save, "save")?;
        let mut guard = self
            .reservations
            .lock()
            .expect("reservations mutex poisoned");
        if let Some(slot) = guard.iter_mut().find(|entry| entry.id == reservation.id) {
            *slot = reservation.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), String> {
        self.failures.check(self.failures.delete, "delete")?;
        let mut guard = self
            .reservations
            .lock()
            .expect("reservations mutex poisoned");
        guard.retain(|entry| entry.id != id);
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct RecordingImages {
    images: Arc<Mutex<Vec<StoredImage>>>,
    failures: FailureFlags,
}

impl RecordingImages {
    pub(crate) fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_images(images: Vec<StoredImage>) -> Self {
        Self {
            images: Arc::new(Mutex::new(images)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn all(&self) -> Vec<StoredImage> {
        self.images.lock().expect("images mutex poisoned").clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImages {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<StoredImage>, String> {
        self.failures.check(self.failures.find, "find")?;
        Ok(self
            .all()
            .into_iter()
            .filter(|image| image.venue_id == venue_id)
            .collect())
    }

    async fn insert(&self, venue_id: i32, name: &str, data: &[u8]) -> Result<(), String> {
        self.failures.check(self.failures.insert, "insert")?;
        let mut guard = self.images.lock().expect("images mutex poisoned");
        let id = guard.iter().map(|image| image.id).max().unwrap_or(0) + 1;
        guard.push(StoredImage {
            id,
            venue_id,
            name: name.to_string(),
            image_data: data.to_vec(),
        });
        Ok(())
    }
}

// Geolocation stub with call counters so tests can assert which lookups ran.
pub(crate) struct StubGeo {
    pub(crate) city: String,
    pub(crate) nearby: Vec<String>,
    pub(crate) city_calls: Arc<Mutex<u32>>,
    pub(crate) nearby_calls: Arc<Mutex<u32>>,
}

impl StubGeo {
    pub(crate) fn new(city: impl Into<String>, nearby: Vec<&str>) -> Self {
        Self {
            city: city.into(),
            nearby: nearby.into_iter().map(String::from).collect(),
            city_calls: Arc::new(Mutex::new(0)),
            nearby_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub(crate) fn city_calls(&self) -> u32 {
        *self.city_calls.lock().expect("counter mutex poisoned")
    }

    pub(crate) fn nearby_calls(&self) -> u32 {
        *self.nearby_calls.lock().expect("counter mutex poisoned")
    }
}

#[async_trait]
impl GeoProvider for StubGeo {
    async fn current_city(&self, _latitude: f64, _longitude: f64) -> String {
        *self.city_calls.lock().expect("counter mutex poisoned") += 1;
        self.city.clone()
    }

    async fn nearby_cities(&self, _latitude: f64, _longitude: f64) -> Vec<String> {
        *self.nearby_calls.lock().expect("counter mutex poisoned") += 1;
        self.nearby.clone()
    }
}

#[derive(Clone)]
pub(crate) struct RecordingMailer {
    pub(crate) sent: Arc<Mutex<Vec<(String, String, String)>>>,
    should_fail: bool,
}

impl RecordingMailer {
    pub(crate) fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    pub(crate) fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("send failed".to_string());
        }
        let mut guard = self.sent.lock().expect("sent mutex poisoned");
        guard.push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}
