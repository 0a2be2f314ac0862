//! Vehicle model
//!
//! Inventory entries that bookings reserve.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of a vehicle
///
/// Flipped to `Booked` together with booking creation and back to
/// `Available` when the holding booking leaves the `active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Booked,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "available"),
            AvailabilityStatus::Booked => write!(f, "booked"),
        }
    }
}

impl AvailabilityStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(AvailabilityStatus::Available),
            "booked" => Some(AvailabilityStatus::Booked),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityStatus::Available)
    }
}

/// Vehicle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: i32,

    /// Display name, e.g. "Toyota Corolla 2022"
    pub vehicle_name: String,

    /// Free-form category (car, bike, van, SUV)
    #[serde(rename = "type")]
    pub vehicle_type: String,

    /// Registration plate, unique across the inventory
    pub registration_number: String,

    /// Price per rented day in the smallest currency unit
    pub daily_rent_price: i64,

    /// Current availability
    pub availability_status: AvailabilityStatus,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            id: 0,
            vehicle_name: String::new(),
            vehicle_type: String::new(),
            registration_number: String::new(),
            daily_rent_price: 0,
            availability_status: AvailabilityStatus::Available,
        }
    }
}

/// Partial vehicle update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePatch {
    pub vehicle_name: Option<String>,
    pub vehicle_type: Option<String>,
    pub registration_number: Option<String>,
    pub daily_rent_price: Option<i64>,
    pub availability_status: Option<AvailabilityStatus>,
}

impl VehiclePatch {
    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch to a vehicle, keeping unspecified fields
    pub fn apply_to(&self, vehicle: &mut Vehicle) {
        if let Some(name) = &self.vehicle_name {
            vehicle.vehicle_name = name.clone();
        }
        if let Some(vehicle_type) = &self.vehicle_type {
            vehicle.vehicle_type = vehicle_type.clone();
        }
        if let Some(registration) = &self.registration_number {
            vehicle.registration_number = registration.clone();
        }
        if let Some(price) = self.daily_rent_price {
            vehicle.daily_rent_price = price;
        }
        if let Some(status) = self.availability_status {
            vehicle.availability_status = status;
        }
    }
}

/// Vehicle fields embedded in booking listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub vehicle_name: String,
    pub registration_number: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_name: vehicle.vehicle_name.clone(),
            registration_number: vehicle.registration_number.clone(),
            vehicle_type: vehicle.vehicle_type.clone(),
        }
    }
}
