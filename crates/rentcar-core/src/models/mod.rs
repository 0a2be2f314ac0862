//! Domain models for RentCar
//!
//! This module contains all the core domain models used throughout the application.

pub mod booking;
pub mod user;
pub mod vehicle;

pub use booking::{Booking, BookingDetails, BookingStatus, CustomerSummary, NewBooking};
pub use user::{Principal, User, UserInfo, UserRole};
pub use vehicle::{AvailabilityStatus, Vehicle, VehiclePatch, VehicleSummary};
