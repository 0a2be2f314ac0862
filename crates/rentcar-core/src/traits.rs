//! Common traits for repositories
//!
//! Defines the storage abstractions the services are written against.
//! PostgreSQL and in-memory implementations live in `rentcar-db`.

use crate::error::AppError;
use crate::models::{
    Booking, BookingDetails, BookingStatus, NewBooking, User, Vehicle, VehiclePatch,
};
use async_trait::async_trait;

/// Result of a guarded delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row removed
    Deleted,
    /// No row with that id
    NotFound,
    /// Row kept because an active booking still references it
    HasActiveBookings,
}

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities, ordered by id
    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    /// Create a new entity; the id of the argument is ignored
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID unless an active booking references it
    async fn delete(&self, id: ID) -> Result<DeleteOutcome, AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Repository<User, i32> {
    /// Find user by (lowercase) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Overwrite every mutable column of a user
    async fn update(&self, user: &User) -> Result<User, AppError>;
}

/// Vehicle repository trait with specialized methods
#[async_trait]
pub trait VehicleRepository: Repository<Vehicle, i32> {
    /// Find vehicle by registration number
    async fn find_by_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Vehicle>, AppError>;

    /// Apply a partial update under a row lock.
    ///
    /// Returns `Ok(None)` when the vehicle does not exist. A patch that sets
    /// `availability_status` fails with `Conflict` while an active booking
    /// holds the vehicle.
    async fn apply_patch(
        &self,
        id: i32,
        patch: &VehiclePatch,
    ) -> Result<Option<Vehicle>, AppError>;
}

/// Booking repository trait
///
/// Bookings are never deleted, and their status only changes through
/// [`BookingRepository::transition`].
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Booking>, AppError>;

    /// Bookings of one customer with vehicle summaries, newest first
    async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<BookingDetails>, AppError>;

    /// Every booking with customer and vehicle summaries, newest first
    async fn list_all(&self) -> Result<Vec<BookingDetails>, AppError>;

    /// Flip the vehicle to booked and insert the booking as one unit.
    ///
    /// Fails with `VehicleUnavailable` when the vehicle is not available at
    /// the moment of the flip, and `VehicleNotFound` when it does not exist.
    async fn create_reserving_vehicle(&self, booking: &NewBooking) -> Result<Booking, AppError>;

    /// Move a booking from `from` to `to` as one unit.
    ///
    /// When `release_vehicle` is set the referenced vehicle goes back to
    /// available and is returned alongside the booking. Fails with
    /// `InvalidTransition` if the stored status is no longer `from`.
    async fn transition(
        &self,
        id: i32,
        from: BookingStatus,
        to: BookingStatus,
        release_vehicle: bool,
    ) -> Result<(Booking, Option<Vehicle>), AppError>;
}
