use chrono::Datelike;
use tracing::error;

use crate::domain::entities::NewReservation;
use crate::domain::errors::DomainError;
use crate::domain::ports::{ReservationStore, UserStore, VenueStore, WorkingDaysStore};
use crate::domain::schedule::{is_within_working_hours, surrounding_half_hours};
use crate::interface_adapters::protocol::{
    BasicResponse, CreateReservationRequest, Reservation, UpdateReservationRequest,
};

// Booking lifecycle. A booking counts against capacity together with every
// other booking in the same half-hour window, and both creating and moving a
// booking re-check the venue's schedule.
pub struct ReservationService<S, U, V, W> {
    pub reservations: S,
    pub users: U,
    pub venues: V,
    pub working_days: W,
}

impl<S, U, V, W> ReservationService<S, U, V, W>
where
    S: ReservationStore,
    U: UserStore,
    V: VenueStore,
    W: WorkingDaysStore,
{
    pub async fn create(
        &self,
        request: CreateReservationRequest,
    ) -> Result<BasicResponse, DomainError> {
        let user = self
            .users
            .find_by_id(request.user_id)
            .await
            .map_err(DomainError::Storage)?;
        if user.is_none() {
            return Ok(BasicResponse::fail("User not found. Please try again later."));
        }

        let venue = self
            .venues
            .find_by_id(request.venue_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueNotFound(request.venue_id))?;

        if !is_within_working_hours(request.reservation_date, &venue.working_hours) {
            return Ok(BasicResponse::fail(
                "The venue is closed at the selected time. Please choose a different time.",
            ));
        }
        if !self.is_open_on(venue.id, request.reservation_date).await? {
            return Ok(BasicResponse::fail(
                "The venue is closed on the selected day. Please choose a different day.",
            ));
        }

        // The capacity check and the insert run inside one store transaction
        // so concurrent bookings cannot overfill the window.
        let (from, until) = surrounding_half_hours(request.reservation_date);
        let new_reservation = NewReservation {
            user_id: request.user_id,
            venue_id: request.venue_id,
            datetime: request.reservation_date,
            number_of_guests: request.number_of_people,
        };
        match self
            .reservations
            .insert_if_capacity(&new_reservation, from, until, venue.maximum_capacity)
            .await
        {
            Ok(true) => Ok(BasicResponse::ok("Reservation created successfully.")),
            Ok(false) => Ok(BasicResponse::fail(
                "The venue is fully booked for the selected time. Please choose a different time.",
            )),
            Err(err) => {
                error!(error = %err, "failed to insert reservation");
                Ok(BasicResponse::fail(
                    "Error while creating reservation. Please try again later.",
                ))
            }
        }
    }

    pub async fn update(
        &self,
        reservation_id: i32,
        request: Option<UpdateReservationRequest>,
    ) -> Result<BasicResponse, DomainError> {
        let mut reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::ReservationNotFound(reservation_id))?;

        let request = match request {
            Some(request) if !request.number_of_people.is_some_and(|count| count <= 0) => request,
            _ => return Ok(BasicResponse::fail("Request is not valid.")),
        };
        // A request that only repeats the stored values changes nothing.
        let date_changed = request
            .reservation_date
            .is_some_and(|date| date != reservation.datetime);
        let guests_changed = request
            .number_of_people
            .is_some_and(|count| count != reservation.number_of_guests);
        if !date_changed && !guests_changed {
            return Ok(BasicResponse::fail(
                "No modifications found. Please change at least one field.",
            ));
        }

        let venue = self
            .venues
            .find_by_id(reservation.venue_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::VenueNotFound(reservation.venue_id))?;

        let datetime = request.reservation_date.unwrap_or(reservation.datetime);
        if !is_within_working_hours(datetime, &venue.working_hours) {
            return Ok(BasicResponse::fail(
                "The venue is closed at the selected time. Please choose a different time.",
            ));
        }
        if !self.is_open_on(venue.id, datetime).await? {
            return Ok(BasicResponse::fail(
                "The venue is closed on the selected day. Please choose a different day.",
            ));
        }

        reservation.datetime = datetime;
        if let Some(count) = request.number_of_people {
            reservation.number_of_guests = count;
        }

        if let Err(err) = self.reservations.save(&reservation).await {
            error!(error = %err, "failed to save reservation");
            return Ok(BasicResponse::fail(
                "Error while updating reservation. Please try again later.",
            ));
        }

        Ok(BasicResponse::ok("Reservation updated successfully."))
    }

    pub async fn delete(&self, reservation_id: i32) -> Result<BasicResponse, DomainError> {
        self.reservations
            .find_by_id(reservation_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::ReservationNotFound(reservation_id))?;

        if let Err(err) = self.reservations.delete(reservation_id).await {
            error!(error = %err, "failed to delete reservation");
            return Ok(BasicResponse::fail(
                "Error while deleting reservation. Please try again later.",
            ));
        }

        Ok(BasicResponse::ok("Reservation deleted successfully."))
    }

    // Unknown users simply have no reservations.
    pub async fn get_by_user(&self, user_id: i32) -> Result<Vec<Reservation>, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(DomainError::Storage)?;
        if user.is_none() {
            return Ok(Vec::new());
        }

        let reservations = self
            .reservations
            .find_by_user_id(user_id)
            .await
            .map_err(DomainError::Storage)?;
        Ok(reservations.iter().map(Reservation::from).collect())
    }

    pub async fn get_by_owner(&self, owner_id: i32) -> Result<Vec<Reservation>, DomainError> {
        let ids = self.owned_venue_ids(owner_id).await?;
        let reservations = self
            .reservations
            .find_by_venue_ids(&ids)
            .await
            .map_err(DomainError::Storage)?;
        Ok(reservations.iter().map(Reservation::from).collect())
    }

    pub async fn get_count(&self, owner_id: i32) -> Result<i64, DomainError> {
        let ids = self.owned_venue_ids(owner_id).await?;
        self.reservations
            .count_by_venue_ids(&ids)
            .await
            .map_err(DomainError::Storage)
    }

    async fn owned_venue_ids(&self, owner_id: i32) -> Result<Vec<i32>, DomainError> {
        let venues = self
            .venues
            .find_all_by_owner(owner_id)
            .await
            .map_err(DomainError::Storage)?;
        Ok(venues.iter().map(|venue| venue.id).collect())
    }

    async fn is_open_on(
        &self,
        venue_id: i32,
        datetime: chrono::NaiveDateTime,
    ) -> Result<bool, DomainError> {
        let days = self
            .working_days
            .find_by_venue_id(venue_id)
            .await
            .map_err(DomainError::Storage)?;
        let day = datetime.weekday().num_days_from_monday() as i32;
        Ok(days.contains(&day))
    }
}
