use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use crate::domain::entities::{NewVenue, NewVenueRating, PageRequest, Role, VenueEntity};
use crate::domain::errors::DomainError;
use crate::domain::ports::{
    Clock, GeoProvider, ReservationStore, UserStore, VenueFilter, VenueRatingStore, VenueStore,
    VenueTypeStore, WorkingDaysStore,
};
use crate::domain::schedule::surrounding_half_hours;
use crate::interface_adapters::clients::geo::DEFAULT_CITY;
use crate::interface_adapters::protocol::{
    BasicResponse, CreateVenueRequest, DataResponse, PagedResponse, UpdateVenueRequest, Venue,
    VenueRating, VenueType,
};

// Valid rating bounds, inclusive.
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

// Venue listings, discovery categories, ratings and owner statistics. Every
// returned venue view carries the rating recomputed from its rating rows and
// the capacity left in the current half-hour window.
pub struct VenueService<V, W, R, T, U, S, C> {
    pub venues: V,
    pub working_days: W,
    pub ratings: R,
    pub types: T,
    pub users: U,
    pub reservations: S,
    pub clock: C,
    pub geo: Arc<dyn GeoProvider>,
}

impl<V, W, R, T, U, S, C> VenueService<V, W, R, T, U, S, C>
where
    V: VenueStore,
    W: WorkingDaysStore,
    R: VenueRatingStore,
    T: VenueTypeStore,
    U: UserStore,
    S: ReservationStore,
    C: Clock,
{
    pub async fn get(&self, venue_id: i32) -> Result<Venue, DomainError> {
        let venue = self
            .venues
            .find_by_id(venue_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueNotFound(venue_id))?;

        let mut views = self.assemble(vec![venue]).await?;
        Ok(views.remove(0))
    }

    pub async fn get_all(
        &self,
        page: PageRequest,
        search_query: Option<String>,
        type_ids: Option<Vec<i32>>,
    ) -> Result<PagedResponse<Venue>, DomainError> {
        let filter = VenueFilter {
            search_query,
            type_ids,
        };
        let found = self
            .venues
            .find_page(page, &filter)
            .await
            .map_err(DomainError::Storage)?;

        let content = self.assemble(found.items).await?;
        Ok(PagedResponse::new(content, page, found.total))
    }

    pub async fn get_new(&self, page: PageRequest) -> Result<PagedResponse<Venue>, DomainError> {
        let found = self
            .venues
            .find_newest(page)
            .await
            .map_err(DomainError::Storage)?;

        let content = self.assemble(found.items).await?;
        Ok(PagedResponse::new(content, page, found.total))
    }

    pub async fn get_suggested(
        &self,
        page: PageRequest,
    ) -> Result<PagedResponse<Venue>, DomainError> {
        let found = self
            .venues
            .find_suggested(page)
            .await
            .map_err(DomainError::Storage)?;

        let content = self.assemble(found.items).await?;
        Ok(PagedResponse::new(content, page, found.total))
    }

    // Venues ordered by reservation count. The stat order is authoritative;
    // venues deleted since the stats were taken are skipped.
    pub async fn get_trending(
        &self,
        page: PageRequest,
    ) -> Result<PagedResponse<Venue>, DomainError> {
        let stats = self
            .reservations
            .top_venues_by_reservations(page)
            .await
            .map_err(DomainError::Storage)?;

        let ids: Vec<i32> = stats.items.iter().map(|stat| stat.venue_id).collect();
        let venues = self
            .venues
            .find_by_ids(&ids)
            .await
            .map_err(DomainError::Storage)?;
        let by_id: HashMap<i32, VenueEntity> =
            venues.into_iter().map(|venue| (venue.id, venue)).collect();

        let ordered: Vec<VenueEntity> = ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect();

        let content = self.assemble(ordered).await?;
        Ok(PagedResponse::new(content, page, stats.total))
    }

    // Venues in the cities around the caller. Without coordinates the default
    // city is used and no lookups are made.
    pub async fn get_nearby(
        &self,
        page: PageRequest,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<PagedResponse<Venue>, DomainError> {
        let locations = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                let current = self.geo.current_city(latitude, longitude).await;
                let mut cities = self.geo.nearby_cities(latitude, longitude).await;
                if !cities.contains(&current) {
                    cities.push(current);
                }
                cities
            }
            _ => vec![DEFAULT_CITY.to_string()],
        };

        let found = self
            .venues
            .find_by_locations(&locations, page)
            .await
            .map_err(DomainError::Storage)?;

        let content = self.assemble(found.items).await?;
        Ok(PagedResponse::new(content, page, found.total))
    }

    pub async fn get_by_owner(
        &self,
        owner_id: i32,
        page: PageRequest,
    ) -> Result<PagedResponse<Venue>, DomainError> {
        let found = self
            .venues
            .find_by_owner(owner_id, page)
            .await
            .map_err(DomainError::Storage)?;

        let content = self.assemble(found.items).await?;
        Ok(PagedResponse::new(content, page, found.total))
    }

    pub async fn get_count_by_owner(&self, owner_id: i32) -> Result<i64, DomainError> {
        self.venues
            .count_by_owner(owner_id)
            .await
            .map_err(DomainError::Storage)
    }

    pub async fn get_type(&self, type_id: i32) -> Result<String, DomainError> {
        let venue_type = self
            .types
            .find_by_id(type_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueTypeNotFound(type_id))?;

        Ok(venue_type.name)
    }

    pub async fn get_all_types(&self) -> Result<Vec<VenueType>, DomainError> {
        let types = self
            .types
            .find_all()
            .await
            .map_err(DomainError::Storage)?;

        Ok(types.iter().map(VenueType::from).collect())
    }

    pub async fn get_average_rating(&self, venue_id: i32) -> Result<f64, DomainError> {
        let venue = self
            .venues
            .find_by_id(venue_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueNotFound(venue_id))?;

        Ok(venue.average_rating)
    }

    pub async fn get_all_ratings(&self, venue_id: i32) -> Result<Vec<VenueRating>, DomainError> {
        let ratings = self
            .ratings
            .find_by_venue_id(venue_id)
            .await
            .map_err(DomainError::Storage)?;

        Ok(ratings.iter().map(VenueRating::from).collect())
    }

    // Mean of the owner's venue averages, 0.0 when the owner has no venues.
    pub async fn get_overall_rating(&self, owner_id: i32) -> Result<f64, DomainError> {
        let venues = self
            .venues
            .find_all_by_owner(owner_id)
            .await
            .map_err(DomainError::Storage)?;

        if venues.is_empty() {
            return Ok(0.0);
        }

        let sum: f64 = venues.iter().map(|venue| venue.average_rating).sum();
        Ok(sum / venues.len() as f64)
    }

    pub async fn get_ratings_count(&self, owner_id: i32) -> Result<i64, DomainError> {
        let venues = self
            .venues
            .find_all_by_owner(owner_id)
            .await
            .map_err(DomainError::Storage)?;
        let ids: Vec<i32> = venues.iter().map(|venue| venue.id).collect();

        self.ratings
            .count_by_venue_ids(&ids)
            .await
            .map_err(DomainError::Storage)
    }

    // Percentage of the owner's summed capacity booked in the current
    // half-hour window.
    pub async fn get_utilisation_rate(&self, owner_id: i32) -> Result<f64, DomainError> {
        let venues = self
            .venues
            .find_all_by_owner(owner_id)
            .await
            .map_err(DomainError::Storage)?;

        if venues.is_empty() {
            return Ok(0.0);
        }

        let total_capacity: i64 = venues
            .iter()
            .map(|venue| venue.maximum_capacity as i64)
            .sum();
        if total_capacity == 0 {
            return Ok(0.0);
        }

        let ids: Vec<i32> = venues.iter().map(|venue| venue.id).collect();
        let (from, until) = surrounding_half_hours(self.clock.now());
        let reservations = self
            .reservations
            .find_in_window_for_venues(&ids, from, until)
            .await
            .map_err(DomainError::Storage)?;
        let booked: i64 = reservations
            .iter()
            .map(|entry| entry.number_of_guests as i64)
            .sum();

        Ok(booked as f64 / total_capacity as f64 * 100.0)
    }

    pub async fn create(&self, request: CreateVenueRequest) -> DataResponse<i32> {
        if request.name.trim().is_empty() {
            return DataResponse::fail("Name cannot be empty.");
        }
        if request.location.trim().is_empty() {
            return DataResponse::fail("Location cannot be empty.");
        }
        if request.working_days.is_empty() {
            return DataResponse::fail("Working days cannot be empty.");
        }
        if request.working_days.iter().any(|day| !(0..=6).contains(day)) {
            return DataResponse::fail("Working days must be between Monday and Sunday.");
        }
        if request.working_hours.trim().is_empty() {
            return DataResponse::fail("Working hours cannot be empty.");
        }
        if request.maximum_capacity <= 0 {
            return DataResponse::fail("Maximum capacity must be positive.");
        }

        match self.types.find_by_id(request.type_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return DataResponse::fail("Invalid venue type id."),
            Err(err) => {
                error!(error = %err, "venue type lookup failed during venue creation");
                return DataResponse::fail("Error while creating venue. Please try again later.");
            }
        }

        let user = match self.users.find_by_id(request.owner_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return DataResponse::fail("User does not exist."),
            Err(err) => {
                error!(error = %err, "owner lookup failed during venue creation");
                return DataResponse::fail("Error while creating venue. Please try again later.");
            }
        };
        if Role::from_id(user.role_id) != Role::Owner {
            return DataResponse::fail("User is not a valid owner.");
        }

        match self
            .venues
            .find_by_owner_and_name(request.owner_id, &request.name)
            .await
        {
            Ok(Some(_)) => {
                return DataResponse::fail(format!(
                    "Venue with name '{}' already exists for this owner.",
                    request.name
                ))
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "duplicate check failed during venue creation");
                return DataResponse::fail("Error while creating venue. Please try again later.");
            }
        }

        let new_venue = NewVenue {
            owner_id: request.owner_id,
            name: request.name.clone(),
            location: request.location.clone(),
            working_hours: request.working_hours.clone(),
            maximum_capacity: request.maximum_capacity,
            available_capacity: request.available_capacity,
            venue_type_id: request.type_id,
            description: request.description.clone(),
        };

        let venue_id = match self.venues.insert(&new_venue).await {
            Ok(venue_id) => venue_id,
            Err(err) => {
                error!(error = %err, "failed to insert venue");
                return DataResponse::fail("Error while creating venue. Please try again later.");
            }
        };

        if let Err(err) = self
            .working_days
            .replace_for_venue(venue_id, &request.working_days)
            .await
        {
            error!(error = %err, "failed to store venue working days");
            return DataResponse::fail("Error while creating venue. Please try again later.");
        }

        DataResponse::ok(
            format!("Venue {} created successfully.", request.name),
            venue_id,
        )
    }

    pub async fn update(
        &self,
        venue_id: i32,
        request: Option<UpdateVenueRequest>,
    ) -> Result<BasicResponse, DomainError> {
        let mut venue = self
            .venues
            .find_by_id(venue_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueNotFound(venue_id))?;

        let request = request.unwrap_or_default();
        if request.is_empty() {
            return Ok(BasicResponse::fail(
                "No modifications found. Please change at least one field.",
            ));
        }

        if let Some(new_maximum) = request.maximum_capacity {
            if new_maximum < venue.available_capacity {
                return Ok(BasicResponse::fail(
                    "New maximum capacity cannot exceed current available capacity.",
                ));
            }
            venue.maximum_capacity = new_maximum;
        }
        if let Some(name) = request.name {
            venue.name = name;
        }
        if let Some(location) = request.location {
            venue.location = location;
        }
        if let Some(description) = request.description {
            venue.description = Some(description);
        }
        if let Some(type_id) = request.type_id {
            venue.venue_type_id = type_id;
        }
        if let Some(working_hours) = request.working_hours {
            venue.working_hours = working_hours;
        }

        if let Some(days) = request.working_days.filter(|days| !days.is_empty()) {
            if let Err(err) = self.working_days.replace_for_venue(venue_id, &days).await {
                error!(error = %err, "failed to replace venue working days");
                return Ok(BasicResponse::fail(
                    "Error while updating venue. Please try again later.",
                ));
            }
        }

        if let Err(err) = self.venues.save(&venue).await {
            error!(error = %err, "failed to save venue");
            return Ok(BasicResponse::fail(
                "Error while updating venue. Please try again later.",
            ));
        }

        Ok(BasicResponse::ok("Venue updated successfully."))
    }

    pub async fn rate(
        &self,
        venue_id: i32,
        rating: f64,
        user_id: i32,
        comment: Option<String>,
    ) -> Result<BasicResponse, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Ok(BasicResponse::fail("Rating must be between 1.0 and 5.0."));
        }

        let user = match self
            .users
            .find_by_id(user_id)
            .await
            .map_err(DomainError::Storage)?
        {
            Some(user) => user,
            None => {
                return Ok(BasicResponse::fail(format!(
                    "User with id {user_id} not found."
                )))
            }
        };

        let mut venue = self
            .venues
            .find_by_id(venue_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueNotFound(venue_id))?;

        let existing = self
            .ratings
            .find_by_venue_id(venue_id)
            .await
            .map_err(DomainError::Storage)?;

        let new_rating = NewVenueRating {
            venue_id,
            rating,
            username: user.username,
            comment,
        };
        if let Err(err) = self.ratings.insert(&new_rating).await {
            error!(error = %err, "failed to insert venue rating");
            return Ok(BasicResponse::fail(
                "Error while updating rating. Please try again later.",
            ));
        }

        let sum: f64 = existing.iter().map(|entry| entry.rating).sum();
        venue.average_rating = (sum + rating) / (existing.len() as f64 + 1.0);

        if let Err(err) = self.venues.save(&venue).await {
            error!(error = %err, "failed to save venue average rating");
            return Ok(BasicResponse::fail(
                "Error while updating venue after rating. Please try again later.",
            ));
        }

        Ok(BasicResponse::ok(format!(
            "Venue with id {venue_id} successfully rated with rating {rating:.1}."
        )))
    }

    pub async fn delete(&self, venue_id: i32) -> BasicResponse {
        if let Err(err) = self.venues.delete(venue_id).await {
            error!(error = %err, "failed to delete venue");
            return BasicResponse::fail("Error while deleting venue. Please try again later.");
        }

        BasicResponse::ok("Venue successfully deleted.")
    }

    // Builds venue views for a batch: rating means from the rating rows,
    // working days, and the capacity left in the current half-hour window.
    async fn assemble(&self, venues: Vec<VenueEntity>) -> Result<Vec<Venue>, DomainError> {
        if venues.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = venues.iter().map(|venue| venue.id).collect();

        let ratings = self
            .ratings
            .find_by_venue_ids(&ids)
            .await
            .map_err(DomainError::Storage)?;
        let mut rating_sums: HashMap<i32, (f64, u32)> = HashMap::new();
        for entry in &ratings {
            let slot = rating_sums.entry(entry.venue_id).or_insert((0.0, 0));
            slot.0 += entry.rating;
            slot.1 += 1;
        }

        let days = self
            .working_days
            .find_by_venue_ids(&ids)
            .await
            .map_err(DomainError::Storage)?;
        let mut days_by_venue: HashMap<i32, Vec<i32>> = HashMap::new();
        for (venue_id, day) in days {
            days_by_venue.entry(venue_id).or_default().push(day);
        }

        let (from, until) = surrounding_half_hours(self.clock.now());
        let reservations = self
            .reservations
            .find_in_window_for_venues(&ids, from, until)
            .await
            .map_err(DomainError::Storage)?;
        let mut booked: HashMap<i32, i32> = HashMap::new();
        for entry in &reservations {
            *booked.entry(entry.venue_id).or_insert(0) += entry.number_of_guests;
        }

        Ok(venues
            .into_iter()
            .map(|venue| {
                let average_rating = rating_sums
                    .get(&venue.id)
                    .map(|(sum, count)| sum / *count as f64)
                    .unwrap_or(0.0);
                let available_capacity =
                    (venue.maximum_capacity - booked.get(&venue.id).copied().unwrap_or(0)).max(0);

                Venue {
                    id: venue.id,
                    name: venue.name,
                    location: venue.location,
                    working_days: days_by_venue.remove(&venue.id).unwrap_or_default(),
                    working_hours: venue.working_hours,
                    maximum_capacity: venue.maximum_capacity,
                    available_capacity,
                    average_rating,
                    venue_type_id: venue.venue_type_id,
                    description: venue.description,
                }
            })
            .collect())
    }
}
