//! Vehicle DTOs

use rentcar_core::models::{AvailabilityStatus, VehiclePatch};
use rentcar_core::AppError;
use rentcar_services::NewVehicle;
use serde::Deserialize;
use validator::Validate;

/// Vehicle creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "vehicle_name is required"))]
    pub vehicle_name: String,

    #[serde(default, rename = "type")]
    #[validate(length(min = 1, max = 50, message = "type is required"))]
    pub vehicle_type: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "registration_number is required"))]
    pub registration_number: String,

    #[validate(
        required(message = "daily_rent_price is required"),
        range(min = 1, message = "daily_rent_price must be positive")
    )]
    pub daily_rent_price: Option<i64>,

    pub availability_status: Option<String>,
}

impl TryFrom<CreateVehicleRequest> for NewVehicle {
    type Error = AppError;

    fn try_from(req: CreateVehicleRequest) -> Result<Self, Self::Error> {
        Ok(NewVehicle {
            vehicle_name: req.vehicle_name,
            vehicle_type: req.vehicle_type,
            registration_number: req.registration_number,
            daily_rent_price: req
                .daily_rent_price
                .ok_or_else(|| AppError::MissingField("daily_rent_price".to_string()))?,
            availability_status: req
                .availability_status
                .as_deref()
                .map(parse_availability)
                .transpose()?,
        })
    }
}

/// Partial vehicle update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub vehicle_name: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub registration_number: Option<String>,

    #[validate(range(min = 1, message = "daily_rent_price must be positive"))]
    pub daily_rent_price: Option<i64>,

    pub availability_status: Option<String>,
}

impl TryFrom<UpdateVehicleRequest> for VehiclePatch {
    type Error = AppError;

    fn try_from(req: UpdateVehicleRequest) -> Result<Self, Self::Error> {
        Ok(VehiclePatch {
            vehicle_name: req.vehicle_name,
            vehicle_type: req.vehicle_type,
            registration_number: req.registration_number,
            daily_rent_price: req.daily_rent_price,
            availability_status: req
                .availability_status
                .as_deref()
                .map(parse_availability)
                .transpose()?,
        })
    }
}

fn parse_availability(raw: &str) -> Result<AvailabilityStatus, AppError> {
    AvailabilityStatus::from_str(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid availability_status '{}': expected available or booked",
            raw
        ))
    })
}
