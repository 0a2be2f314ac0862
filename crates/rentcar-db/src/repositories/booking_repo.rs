//! Booking repository implementation
//!
//! Bookings and vehicle availability move together: every write here runs
//! in a single transaction that touches both tables.

use super::vehicle_repo::VehicleRow;
use super::{begin_error, commit_error, map_db_error};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rentcar_core::{
    models::{
        Booking, BookingDetails, BookingStatus, CustomerSummary, NewBooking, Vehicle,
        VehicleSummary,
    },
    traits::BookingRepository,
    AppError, AppResult,
};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, instrument, warn};

const BOOKING_COLUMNS: &str = "id, customer_id, vehicle_id, rent_start_date, rent_end_date, \
     total_price, status, created_at, updated_at";

const DETAILS_SELECT: &str = r#"
    SELECT
        b.id, b.customer_id, b.vehicle_id, b.rent_start_date, b.rent_end_date,
        b.total_price, b.status, b.created_at, b.updated_at,
        u.name AS customer_name, u.email AS customer_email,
        v.vehicle_name, v.registration_number, v.type AS vehicle_type
    FROM bookings b
    LEFT JOIN users u ON u.id = b.customer_id
    LEFT JOIN vehicles v ON v.id = b.vehicle_id
"#;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse booking status from string
    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or(BookingStatus::Active)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find booking", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_for_customer(&self, customer_id: i32) -> AppResult<Vec<BookingDetails>> {
        debug!("Listing bookings for customer {}", customer_id);

        let rows = sqlx::query_as::<_, DetailsRow>(&format!(
            "{} WHERE b.customer_id = $1 ORDER BY b.id DESC",
            DETAILS_SELECT
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list customer bookings", e))?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_details(false))
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<BookingDetails>> {
        debug!("Listing all bookings");

        let rows = sqlx::query_as::<_, DetailsRow>(&format!(
            "{} ORDER BY b.id DESC",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list bookings", e))?;

        Ok(rows.into_iter().map(|row| row.into_details(true)).collect())
    }

    #[instrument(skip(self, booking), fields(vehicle_id = booking.vehicle_id, customer_id = booking.customer_id))]
    async fn create_reserving_vehicle(&self, booking: &NewBooking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        // Conditional flip: only one concurrent request can see 'available'
        let flipped: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE vehicles
            SET availability_status = 'booked'
            WHERE id = $1 AND availability_status = 'available'
            RETURNING id
            "#,
        )
        .bind(booking.vehicle_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("reserve vehicle", e))?;

        if flipped.is_none() {
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS (SELECT 1 FROM vehicles WHERE id = $1)")
                    .bind(booking.vehicle_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_db_error("check vehicle", e))?;

            return Err(if exists {
                warn!("Vehicle {} is not available", booking.vehicle_id);
                AppError::VehicleUnavailable("vehicle not available".to_string())
            } else {
                AppError::VehicleNotFound(booking.vehicle_id.to_string())
            });
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (
                customer_id, vehicle_id, rent_start_date, rent_end_date,
                total_price, status
            )
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.customer_id)
        .bind(booking.vehicle_id)
        .bind(booking.rent_start_date)
        .bind(booking.rent_end_date)
        .bind(booking.total_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("create booking", e))?;

        tx.commit().await.map_err(commit_error)?;

        let created: Booking = row.into();
        info!(
            "Created booking {} for vehicle {} ({} to {}, total {})",
            created.id,
            booking.vehicle_id,
            created.rent_start_date,
            created.rent_end_date,
            created.total_price
        );

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: i32,
        from: BookingStatus,
        to: BookingStatus,
        release_vehicle: bool,
    ) -> AppResult<(Booking, Option<Vehicle>)> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        // Compare-and-set on the status seen by the caller
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error("update booking status", e))?;

        let Some(row) = row else {
            warn!("Booking {} is no longer {}", id, from);
            return Err(AppError::InvalidTransition(format!(
                "Booking is no longer {}",
                from
            )));
        };
        let booking: Booking = row.into();

        let vehicle = match (release_vehicle, booking.vehicle_id) {
            (true, Some(vehicle_id)) => sqlx::query_as::<_, VehicleRow>(
                r#"
                UPDATE vehicles
                SET availability_status = 'available'
                WHERE id = $1
                RETURNING id, vehicle_name, type AS vehicle_type, registration_number,
                          daily_rent_price, availability_status
                "#,
            )
            .bind(vehicle_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_db_error("release vehicle", e))?
            .map(Vehicle::from),
            _ => None,
        };

        tx.commit().await.map_err(commit_error)?;

        info!("Booking {} moved from {} to {}", id, from, to);
        Ok((booking, vehicle))
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: i32,
    customer_id: Option<i32>,
    vehicle_id: Option<i32>,
    rent_start_date: NaiveDate,
    rent_end_date: NaiveDate,
    total_price: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            vehicle_id: row.vehicle_id,
            rent_start_date: row.rent_start_date,
            rent_end_date: row.rent_end_date,
            total_price: row.total_price,
            status: PgBookingRepository::parse_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Booking joined with the (possibly deleted) customer and vehicle
#[derive(FromRow)]
struct DetailsRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    customer_name: Option<String>,
    customer_email: Option<String>,
    vehicle_name: Option<String>,
    registration_number: Option<String>,
    vehicle_type: Option<String>,
}

impl DetailsRow {
    fn into_details(self, with_customer: bool) -> BookingDetails {
        let customer = match (with_customer, self.customer_name, self.customer_email) {
            (true, Some(name), Some(email)) => Some(CustomerSummary { name, email }),
            _ => None,
        };
        let vehicle = match (self.vehicle_name, self.registration_number, self.vehicle_type) {
            (Some(vehicle_name), Some(registration_number), Some(vehicle_type)) => {
                Some(VehicleSummary {
                    vehicle_name,
                    registration_number,
                    vehicle_type,
                })
            }
            _ => None,
        };

        BookingDetails {
            booking: self.booking.into(),
            customer,
            vehicle,
        }
    }
}
