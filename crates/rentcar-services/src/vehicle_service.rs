//! Vehicle inventory service

use rentcar_core::{
    models::{AvailabilityStatus, Vehicle, VehiclePatch},
    traits::{DeleteOutcome, VehicleRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Input for a new inventory entry
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub registration_number: String,
    pub daily_rent_price: i64,
    pub availability_status: Option<AvailabilityStatus>,
}

/// Inventory management
pub struct VehicleService {
    vehicles: Arc<dyn VehicleRepository>,
}

impl VehicleService {
    pub fn new(vehicles: Arc<dyn VehicleRepository>) -> Self {
        Self { vehicles }
    }

    /// Add a vehicle to the inventory
    ///
    /// New vehicles always start available; only a booking may mark one booked.
    #[instrument(skip(self, input), fields(registration = %input.registration_number))]
    pub async fn create(&self, input: NewVehicle) -> AppResult<Vehicle> {
        let vehicle_name = required("vehicle_name", &input.vehicle_name)?;
        let vehicle_type = required("type", &input.vehicle_type)?;
        let registration_number = required("registration_number", &input.registration_number)?;
        check_price(input.daily_rent_price)?;
        if let Some(AvailabilityStatus::Booked) = input.availability_status {
            return Err(booked_by_hand());
        }

        if self
            .vehicles
            .find_by_registration(&registration_number)
            .await?
            .is_some()
        {
            warn!("Vehicle rejected: registration number taken");
            return Err(AppError::AlreadyExists(
                "Registration number already exists".to_string(),
            ));
        }

        let vehicle = self
            .vehicles
            .create(&Vehicle {
                vehicle_name,
                vehicle_type,
                registration_number,
                daily_rent_price: input.daily_rent_price,
                availability_status: AvailabilityStatus::Available,
                ..Default::default()
            })
            .await?;

        info!(vehicle_id = vehicle.id, "Vehicle added");
        Ok(vehicle)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.vehicles.find_all().await?;
        debug!("Fetched {} vehicles", vehicles.len());
        Ok(vehicles)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> AppResult<Vehicle> {
        self.vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))
    }

    /// Partially update a vehicle
    ///
    /// Availability may be set back to `available` by hand, but never to
    /// `booked`, and never while an active booking holds the vehicle.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i32, mut patch: VehiclePatch) -> AppResult<Vehicle> {
        if let Some(name) = &patch.vehicle_name {
            patch.vehicle_name = Some(required("vehicle_name", name)?);
        }
        if let Some(vehicle_type) = &patch.vehicle_type {
            patch.vehicle_type = Some(required("type", vehicle_type)?);
        }
        if let Some(price) = patch.daily_rent_price {
            check_price(price)?;
        }
        if let Some(AvailabilityStatus::Booked) = patch.availability_status {
            return Err(booked_by_hand());
        }

        if let Some(registration) = &patch.registration_number {
            let registration = required("registration_number", registration)?;
            if let Some(other) = self.vehicles.find_by_registration(&registration).await? {
                if other.id != id {
                    return Err(AppError::AlreadyExists(
                        "Registration number already exists".to_string(),
                    ));
                }
            }
            patch.registration_number = Some(registration);
        }

        if patch.is_empty() {
            return self.get(id).await;
        }

        let vehicle = self
            .vehicles
            .apply_patch(id, &patch)
            .await?
            .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))?;

        info!(vehicle_id = id, "Vehicle updated");
        Ok(vehicle)
    }

    /// Remove a vehicle that no active booking holds
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        match self.vehicles.delete(id).await? {
            DeleteOutcome::Deleted => {
                info!(vehicle_id = id, "Vehicle deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(AppError::VehicleNotFound(id.to_string())),
            DeleteOutcome::HasActiveBookings => {
                warn!(vehicle_id = id, "Delete rejected: active bookings");
                Err(AppError::Conflict(
                    "Cannot delete vehicle with active bookings".to_string(),
                ))
            }
        }
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::MissingField(field.to_string()));
    }
    Ok(value.to_string())
}

fn check_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::Validation(
            "daily_rent_price must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn booked_by_hand() -> AppError {
    AppError::Validation("availability_status can only become booked through a booking".to_string())
}
