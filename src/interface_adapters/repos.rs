use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::domain::entities::{
    NewReservation, NewUser, NewVenue, NewVenueRating, NotificationOptionsEntity, Page,
    PageRequest, ReservationEntity, StoredImage, UserEntity, VenueEntity, VenueRatingEntity,
    VenueReservationCount, VenueTypeEntity,
};
use crate::domain::ports::{
    ImageStore, NotificationOptionsStore, ReservationStore, UserStore, VenueFilter,
    VenueRatingStore, VenueStore, VenueTypeStore, WorkingDaysStore,
};

fn db_err(err: sqlx::Error) -> String {
    err.to_string()
}

#[derive(Clone)]
pub struct PostgresUserStore {
    pub db: PgPool,
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, String> {
        sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserEntity>, String> {
        sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<UserEntity>, String> {
        sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn insert(&self, user: &NewUser) -> Result<UserEntity, String> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (username, email, password, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role_id)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn save(&self, user: &UserEntity) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $2,
                email = $3,
                password = $4,
                last_known_latitude = $5,
                last_known_longitude = $6,
                role_id = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.last_known_latitude)
        .bind(user.last_known_longitude)
        .bind(user.role_id)
        .execute(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), String> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresNotificationOptionsStore {
    pub db: PgPool,
}

#[async_trait]
impl NotificationOptionsStore for PostgresNotificationOptionsStore {
    async fn find_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Option<NotificationOptionsEntity>, String> {
        sqlx::query_as::<_, NotificationOptionsEntity>(
            "SELECT * FROM notification_options WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)
    }

    async fn insert_defaults(&self, user_id: i32) -> Result<NotificationOptionsEntity, String> {
        sqlx::query_as::<_, NotificationOptionsEntity>(
            r#"
            INSERT INTO notification_options (user_id)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn save(&self, options: &NotificationOptionsEntity) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE notification_options
            SET push_notifications_enabled = $2,
                email_notifications_enabled = $3,
                location_services_enabled = $4
            WHERE user_id = $1
            "#,
        )
        .bind(options.user_id)
        .bind(options.push_notifications_enabled)
        .bind(options.email_notifications_enabled)
        .bind(options.location_services_enabled)
        .execute(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresVenueStore {
    pub db: PgPool,
}

#[async_trait]
impl VenueStore for PostgresVenueStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<VenueEntity>, String> {
        sqlx::query_as::<_, VenueEntity>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<VenueEntity>, String> {
        sqlx::query_as::<_, VenueEntity>("SELECT * FROM venues WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_page(
        &self,
        page: PageRequest,
        filter: &VenueFilter,
    ) -> Result<Page<VenueEntity>, String> {
        let items = sqlx::query_as::<_, VenueEntity>(
            r#"
            SELECT * FROM venues
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::int[] IS NULL OR venue_type_id = ANY($2))
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.search_query.as_deref())
        .bind(filter.type_ids.clone())
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(db_err)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM venues
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::int[] IS NULL OR venue_type_id = ANY($2))
            "#,
        )
        .bind(filter.search_query.as_deref())
        .bind(filter.type_ids.clone())
        .fetch_one(&self.db)
        .await
        .map_err(db_err)?;

        Ok(Page { items, total })
    }

    async fn find_newest(&self, page: PageRequest) -> Result<Page<VenueEntity>, String> {
        let items = sqlx::query_as::<_, VenueEntity>(
            "SELECT * FROM venues ORDER BY id DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(db_err)?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM venues")
            .fetch_one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Page { items, total })
    }

    async fn find_suggested(&self, page: PageRequest) -> Result<Page<VenueEntity>, String> {
        let items = sqlx::query_as::<_, VenueEntity>(
            r#"
            SELECT * FROM venues
            WHERE average_rating > 4.0 AND available_capacity > 0
            ORDER BY id DESC, average_rating DESC, available_capacity DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(db_err)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM venues WHERE average_rating > 4.0 AND available_capacity > 0",
        )
        .fetch_one(&self.db)
        .await
        .map_err(db_err)?;

        Ok(Page { items, total })
    }

    async fn find_by_locations(
        &self,
        locations: &[String],
        page: PageRequest,
    ) -> Result<Page<VenueEntity>, String> {
        let items = sqlx::query_as::<_, VenueEntity>(
            "SELECT * FROM venues WHERE location = ANY($1) ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(locations)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(db_err)?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM venues WHERE location = ANY($1)")
                .bind(locations)
                .fetch_one(&self.db)
                .await
                .map_err(db_err)?;

        Ok(Page { items, total })
    }

    async fn find_by_owner(
        &self,
        owner_id: i32,
        page: PageRequest,
    ) -> Result<Page<VenueEntity>, String> {
        let items = sqlx::query_as::<_, VenueEntity>(
            "SELECT * FROM venues WHERE owner_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(db_err)?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM venues WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.db)
                .await
                .map_err(db_err)?;

        Ok(Page { items, total })
    }

    async fn find_all_by_owner(&self, owner_id: i32) -> Result<Vec<VenueEntity>, String> {
        sqlx::query_as::<_, VenueEntity>("SELECT * FROM venues WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: i32,
        name: &str,
    ) -> Result<Option<VenueEntity>, String> {
        sqlx::query_as::<_, VenueEntity>(
            "SELECT * FROM venues WHERE owner_id = $1 AND name = $2",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)
    }

    async fn count_by_owner(&self, owner_id: i32) -> Result<i64, String> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM venues WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn insert(&self, venue: &NewVenue) -> Result<i32, String> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO venues
                (owner_id, name, location, working_hours, maximum_capacity,
                 available_capacity, venue_type_id, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(venue.owner_id)
        .bind(&venue.name)
        .bind(&venue.location)
        .bind(&venue.working_hours)
        .bind(venue.maximum_capacity)
        .bind(venue.available_capacity)
        .bind(venue.venue_type_id)
        .bind(&venue.description)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn save(&self, venue: &VenueEntity) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE venues
            SET name = $2,
                location = $3,
                working_hours = $4,
                maximum_capacity = $5,
                available_capacity = $6,
                average_rating = $7,
                venue_type_id = $8,
                description = $9
            WHERE id = $1
            "#,
        )
        .bind(venue.id)
        .bind(&venue.name)
        .bind(&venue.location)
        .bind(&venue.working_hours)
        .bind(venue.maximum_capacity)
        .bind(venue.available_capacity)
        .bind(venue.average_rating)
        .bind(venue.venue_type_id)
        .bind(&venue.description)
        .execute(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), String> {
        sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresWorkingDaysStore {
    pub db: PgPool,
}

#[async_trait]
impl WorkingDaysStore for PostgresWorkingDaysStore {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<i32>, String> {
        sqlx::query_scalar::<_, i32>(
            "SELECT day_of_week FROM working_days WHERE venue_id = $1 ORDER BY day_of_week",
        )
        .bind(venue_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn find_by_venue_ids(&self, venue_ids: &[i32]) -> Result<Vec<(i32, i32)>, String> {
        sqlx::query_as::<_, (i32, i32)>(
            r#"
            SELECT venue_id, day_of_week FROM working_days
            WHERE venue_id = ANY($1)
            ORDER BY venue_id, day_of_week
            "#,
        )
        .bind(venue_ids)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn replace_for_venue(&self, venue_id: i32, days: &[i32]) -> Result<(), String> {
        let mut tx = self.db.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM working_days WHERE venue_id = $1")
            .bind(venue_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO working_days (venue_id, day_of_week)
            SELECT $1, day FROM UNNEST($2::int[]) AS day
            "#,
        )
        .bind(venue_id)
        .bind(days)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)
    }
}

#[derive(Clone)]
pub struct PostgresVenueRatingStore {
    pub db: PgPool,
}

#[async_trait]
impl VenueRatingStore for PostgresVenueRatingStore {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<VenueRatingEntity>, String> {
        sqlx::query_as::<_, VenueRatingEntity>(
            "SELECT * FROM venue_ratings WHERE venue_id = $1 ORDER BY id DESC",
        )
        .bind(venue_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn find_by_venue_ids(
        &self,
        venue_ids: &[i32],
    ) -> Result<Vec<VenueRatingEntity>, String> {
        sqlx::query_as::<_, VenueRatingEntity>(
            "SELECT * FROM venue_ratings WHERE venue_id = ANY($1)",
        )
        .bind(venue_ids)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn count_by_venue_ids(&self, venue_ids: &[i32]) -> Result<i64, String> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM venue_ratings WHERE venue_id = ANY($1)",
        )
        .bind(venue_ids)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn insert(&self, rating: &NewVenueRating) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO venue_ratings (venue_id, rating, username, comment)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(rating.venue_id)
        .bind(rating.rating)
        .bind(&rating.username)
        .bind(&rating.comment)
        .execute(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresVenueTypeStore {
    pub db: PgPool,
}

#[async_trait]
impl VenueTypeStore for PostgresVenueTypeStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<VenueTypeEntity>, String> {
        sqlx::query_as::<_, VenueTypeEntity>("SELECT * FROM venue_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_all(&self) -> Result<Vec<VenueTypeEntity>, String> {
        sqlx::query_as::<_, VenueTypeEntity>("SELECT * FROM venue_types ORDER BY id")
            .fetch_all(&self.db)
            .await
            .map_err(db_err)
    }
}

#[derive(Clone)]
pub struct PostgresReservationStore {
    pub db: PgPool,
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<ReservationEntity>, String> {
        sqlx::query_as::<_, ReservationEntity>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<ReservationEntity>, String> {
        sqlx::query_as::<_, ReservationEntity>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY datetime",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn find_by_venue_ids(
        &self,
        venue_ids: &[i32],
    ) -> Result<Vec<ReservationEntity>, String> {
        sqlx::query_as::<_, ReservationEntity>(
            "SELECT * FROM reservations WHERE venue_id = ANY($1) ORDER BY datetime",
        )
        .bind(venue_ids)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn find_in_window_for_venues(
        &self,
        venue_ids: &[i32],
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ReservationEntity>, String> {
        sqlx::query_as::<_, ReservationEntity>(
            r#"
            SELECT * FROM reservations
            WHERE venue_id = ANY($1) AND datetime >= $2 AND datetime < $3
            "#,
        )
        .bind(venue_ids)
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn count_by_venue_ids(&self, venue_ids: &[i32]) -> Result<i64, String> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE venue_id = ANY($1)",
        )
        .bind(venue_ids)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn top_venues_by_reservations(
        &self,
        page: PageRequest,
    ) -> Result<Page<VenueReservationCount>, String> {
        let items = sqlx::query_as::<_, VenueReservationCount>(
            r#"
            SELECT venue_id, COUNT(id) AS reservation_count
            FROM reservations
            GROUP BY venue_id
            ORDER BY reservation_count DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await
        .map_err(db_err)?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT venue_id) FROM reservations")
                .fetch_one(&self.db)
                .await
                .map_err(db_err)?;

        Ok(Page { items, total })
    }

    async fn insert_if_capacity(
        &self,
        reservation: &NewReservation,
        from: NaiveDateTime,
        until: NaiveDateTime,
        maximum_capacity: i32,
    ) -> Result<bool, String> {
        let mut tx = self.db.begin().await.map_err(db_err)?;

        // Concurrent bookings for the same window must not both pass the
        // capacity check.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let booked = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(number_of_guests), 0) FROM reservations
            WHERE venue_id = $1 AND datetime >= $2 AND datetime < $3
            "#,
        )
        .bind(reservation.venue_id)
        .bind(from)
        .bind(until)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        if booked + i64::from(reservation.number_of_guests) > i64::from(maximum_capacity) {
            tx.rollback().await.map_err(db_err)?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO reservations (user_id, venue_id, datetime, number_of_guests)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(reservation.user_id)
        .bind(reservation.venue_id)
        .bind(reservation.datetime)
        .bind(reservation.number_of_guests)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn save(&self, reservation: &ReservationEntity) -> Result<(), String> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET datetime = $2, number_of_guests = $3
            WHERE id = $1
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.datetime)
        .bind(reservation.number_of_guests)
        .execute(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), String> {
        sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

// Venue photos and menu photos share a schema; the table name picks the kind.
#[derive(Clone)]
pub struct PostgresImageStore {
    db: PgPool,
    table: &'static str,
}

impl PostgresImageStore {
    pub fn venue_images(db: PgPool) -> Self {
        Self {
            db,
            table: "venue_images",
        }
    }

    pub fn menu_images(db: PgPool) -> Self {
        Self {
            db,
            table: "menu_images",
        }
    }
}

#[async_trait]
impl ImageStore for PostgresImageStore {
    async fn find_by_venue_id(&self, venue_id: i32) -> Result<Vec<StoredImage>, String> {
        let query = format!(
            "SELECT * FROM {} WHERE venue_id = $1 ORDER BY id",
            self.table
        );

        sqlx::query_as::<_, StoredImage>(&query)
            .bind(venue_id)
            .fetch_all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn insert(&self, venue_id: i32, name: &str, data: &[u8]) -> Result<(), String> {
        let query = format!(
            "INSERT INTO {} (venue_id, name, image_data) VALUES ($1, $2, $3)",
            self.table
        );

        sqlx::query(&query)
            .bind(venue_id)
            .bind(name)
            .bind(data)
            .execute(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}
