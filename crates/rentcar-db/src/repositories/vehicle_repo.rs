//! Vehicle repository implementation
//!
//! Provides PostgreSQL-backed storage for the vehicle inventory.

use super::{begin_error, commit_error, map_db_error};
use async_trait::async_trait;
use rentcar_core::{
    models::{AvailabilityStatus, Vehicle, VehiclePatch},
    traits::{DeleteOutcome, Repository, VehicleRepository},
    AppError, AppResult,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info, instrument, warn};

const VEHICLE_COLUMNS: &str =
    "id, vehicle_name, type AS vehicle_type, registration_number, daily_rent_price, availability_status";

/// PostgreSQL implementation of VehicleRepository
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    /// Create a new vehicle repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse availability from string
    fn parse_availability(s: &str) -> AvailabilityStatus {
        AvailabilityStatus::from_str(s).unwrap_or(AvailabilityStatus::Booked)
    }

    /// Lock a vehicle row for the rest of the transaction
    async fn lock(tx: &mut Transaction<'_, Postgres>, id: i32) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1 FOR UPDATE",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_db_error("lock vehicle", e))?;

        Ok(row.map(Into::into))
    }

    async fn active_bookings(tx: &mut Transaction<'_, Postgres>, id: i32) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE vehicle_id = $1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_db_error("count active bookings", e))?;

        Ok(count)
    }
}

#[async_trait]
impl Repository<Vehicle, i32> for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        debug!("Finding vehicle by id: {}", id);

        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find vehicle", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Vehicle>> {
        debug!("Finding all vehicles");

        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM vehicles ORDER BY id",
            VEHICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list vehicles", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, entity), fields(registration = %entity.registration_number))]
    async fn create(&self, entity: &Vehicle) -> AppResult<Vehicle> {
        debug!("Creating vehicle");

        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            r#"
            INSERT INTO vehicles (
                vehicle_name, type, registration_number,
                daily_rent_price, availability_status
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(&entity.vehicle_name)
        .bind(&entity.vehicle_type)
        .bind(&entity.registration_number)
        .bind(entity.daily_rent_price)
        .bind(entity.availability_status.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("create vehicle", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        debug!("Deleting vehicle: {}", id);

        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        if Self::lock(&mut tx, id).await?.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        if Self::active_bookings(&mut tx, id).await? > 0 {
            return Ok(DeleteOutcome::HasActiveBookings);
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("delete vehicle", e))?;

        tx.commit().await.map_err(commit_error)?;

        info!("Deleted vehicle {}", id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn find_by_registration(&self, registration_number: &str) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM vehicles WHERE registration_number = $1",
            VEHICLE_COLUMNS
        ))
        .bind(registration_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find vehicle by registration", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, patch))]
    async fn apply_patch(&self, id: i32, patch: &VehiclePatch) -> AppResult<Option<Vehicle>> {
        debug!("Updating vehicle: {}", id);

        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let Some(mut vehicle) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        if patch.availability_status.is_some() && Self::active_bookings(&mut tx, id).await? > 0 {
            warn!("Refusing availability change on vehicle {} with active booking", id);
            return Err(AppError::Conflict(
                "Vehicle has an active booking; availability follows the booking".to_string(),
            ));
        }

        patch.apply_to(&mut vehicle);

        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            r#"
            UPDATE vehicles
            SET vehicle_name = $2,
                type = $3,
                registration_number = $4,
                daily_rent_price = $5,
                availability_status = $6
            WHERE id = $1
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .bind(&vehicle.vehicle_name)
        .bind(&vehicle.vehicle_type)
        .bind(&vehicle.registration_number)
        .bind(vehicle.daily_rent_price)
        .bind(vehicle.availability_status.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("update vehicle", e))?;

        tx.commit().await.map_err(commit_error)?;

        Ok(Some(row.into()))
    }
}

#[derive(FromRow)]
pub(crate) struct VehicleRow {
    pub(crate) id: i32,
    pub(crate) vehicle_name: String,
    pub(crate) vehicle_type: String,
    pub(crate) registration_number: String,
    pub(crate) daily_rent_price: i64,
    pub(crate) availability_status: String,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            vehicle_name: row.vehicle_name,
            vehicle_type: row.vehicle_type,
            registration_number: row.registration_number,
            daily_rent_price: row.daily_rent_price,
            availability_status: PgVehicleRepository::parse_availability(
                &row.availability_status,
            ),
        }
    }
}
