//! Business logic services for RentCar
//!
//! Services orchestrate the repositories from `rentcar-core`:
//!
//! - `UserService` - registration, login and account maintenance
//! - `VehicleService` - inventory CRUD
//! - `BookingService` - booking creation, listing and status transitions
//!
//! The rules that need no storage (pricing, date handling, who may move a
//! booking where) live in [`lifecycle`].

pub mod booking_service;
pub mod lifecycle;
pub mod user_service;
pub mod vehicle_service;

pub use booking_service::{BookingRequest, BookingService, TransitionOutcome};
pub use user_service::{LoginResult, NewUser, UserChanges, UserService};
pub use vehicle_service::{NewVehicle, VehicleService};
