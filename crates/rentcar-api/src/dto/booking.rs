//! Booking DTOs

use rentcar_core::models::{AvailabilityStatus, Booking};
use rentcar_core::AppError;
use rentcar_services::{BookingRequest, TransitionOutcome};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Booking creation request
///
/// Dates are `YYYY-MM-DD` or RFC 3339 timestamps.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(required(message = "customer_id is required"))]
    pub customer_id: Option<i32>,

    #[validate(required(message = "vehicle_id is required"))]
    pub vehicle_id: Option<i32>,

    #[serde(default)]
    #[validate(length(min = 1, message = "rent_start_date is required"))]
    pub rent_start_date: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "rent_end_date is required"))]
    pub rent_end_date: String,
}

impl TryFrom<CreateBookingRequest> for BookingRequest {
    type Error = AppError;

    fn try_from(req: CreateBookingRequest) -> Result<Self, Self::Error> {
        Ok(BookingRequest {
            customer_id: req
                .customer_id
                .ok_or_else(|| AppError::MissingField("customer_id".to_string()))?,
            vehicle_id: req
                .vehicle_id
                .ok_or_else(|| AppError::MissingField("vehicle_id".to_string()))?,
            rent_start_date: req.rent_start_date,
            rent_end_date: req.rent_end_date,
        })
    }
}

/// Status change request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

/// Vehicle state reported after a return
#[derive(Debug, Clone, Serialize)]
pub struct VehicleAvailability {
    pub availability_status: AvailabilityStatus,
}

/// Booking after a status change
#[derive(Debug, Clone, Serialize)]
pub struct BookingStatusResponse {
    #[serde(flatten)]
    pub booking: Booking,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleAvailability>,
}

impl From<TransitionOutcome> for BookingStatusResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            booking: outcome.booking,
            vehicle: outcome.vehicle.map(|v| VehicleAvailability {
                availability_status: v.availability_status,
            }),
        }
    }
}
