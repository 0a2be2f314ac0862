//! Booking model
//!
//! A booking holds one vehicle for a range of calendar days.
//! The lifecycle:
//! 1. Created `Active`, flipping the vehicle to booked
//! 2. Ends `Cancelled` or `Returned`, releasing the vehicle
//!
//! Terminal states admit no further transition.

use super::vehicle::VehicleSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Booking is holding its vehicle
    #[default]
    Active,
    /// Booking was cancelled before or during the rental
    Cancelled,
    /// Vehicle was returned
    Returned,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Active => write!(f, "active"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Returned => write!(f, "returned"),
        }
    }
}

impl BookingStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(BookingStatus::Active),
            "cancelled" => Some(BookingStatus::Cancelled),
            "returned" => Some(BookingStatus::Returned),
            _ => None,
        }
    }

    /// Check if booking still holds its vehicle
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Active)
    }

    /// Check if booking is finalized
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: i32,

    /// Booking customer; cleared if the user is later deleted
    pub customer_id: Option<i32>,

    /// Booked vehicle; cleared if the vehicle is later deleted
    pub vehicle_id: Option<i32>,

    /// First rented day
    pub rent_start_date: NaiveDate,

    /// Day the vehicle is due back, strictly after the start
    pub rent_end_date: NaiveDate,

    /// Price fixed at creation
    pub total_price: i64,

    /// Current status
    pub status: BookingStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Check whether the booking belongs to the given customer
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.customer_id == Some(user_id)
    }
}

/// Booking ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub rent_start_date: NaiveDate,
    pub rent_end_date: NaiveDate,
    pub total_price: i64,
}

/// Customer fields embedded in admin booking listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
}

/// Booking row joined with the summaries a listing needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(BookingStatus::from_str("active"), Some(BookingStatus::Active));
        assert_eq!(
            BookingStatus::from_str("Cancelled"),
            Some(BookingStatus::Cancelled)
        );
        assert_eq!(
            BookingStatus::from_str("returned"),
            Some(BookingStatus::Returned)
        );
        assert_eq!(BookingStatus::from_str("pending"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BookingStatus::Active.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Returned.is_terminal());
    }

    #[test]
    fn test_ownership() {
        let booking = Booking {
            id: 1,
            customer_id: Some(7),
            vehicle_id: Some(3),
            rent_start_date: date("2024-01-01"),
            rent_end_date: date("2024-01-04"),
            total_price: 300,
            status: BookingStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(booking.is_owned_by(7));
        assert!(!booking.is_owned_by(8));

        let orphan = Booking {
            customer_id: None,
            ..booking
        };
        assert!(!orphan.is_owned_by(7));
    }

    #[test]
    fn test_details_flatten() {
        let details = BookingDetails {
            booking: Booking {
                id: 9,
                customer_id: Some(2),
                vehicle_id: Some(5),
                rent_start_date: date("2024-02-01"),
                rent_end_date: date("2024-02-02"),
                total_price: 40,
                status: BookingStatus::Returned,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            customer: None,
            vehicle: Some(VehicleSummary {
                vehicle_name: "Vespa".to_string(),
                registration_number: "SC-1".to_string(),
                vehicle_type: "bike".to_string(),
            }),
        };

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["id"], 9);
        assert_eq!(value["status"], "returned");
        assert_eq!(value["rent_start_date"], "2024-02-01");
        assert_eq!(value["vehicle"]["type"], "bike");
        assert!(value.get("customer").is_none());
    }
}
