//! In-memory storage
//!
//! A process-local implementation of the repository traits. All tables sit
//! behind one mutex, so each operation is atomic with respect to the others,
//! which mirrors the transactional behaviour of the PostgreSQL repositories:
//! unique email and registration number, one active booking per vehicle,
//! guarded deletes, and `ON DELETE SET NULL` for booking references.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rentcar_core::{
    models::{
        AvailabilityStatus, Booking, BookingDetails, BookingStatus, CustomerSummary, NewBooking,
        User, Vehicle, VehiclePatch, VehicleSummary,
    },
    traits::{BookingRepository, DeleteOutcome, Repository, UserRepository, VehicleRepository},
    AppError, AppResult,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    vehicles: BTreeMap<i32, Vehicle>,
    bookings: BTreeMap<i32, Booking>,
    last_user_id: i32,
    last_vehicle_id: i32,
    last_booking_id: i32,
}

impl Tables {
    fn has_active_booking(&self, matches: impl Fn(&Booking) -> bool) -> bool {
        self.bookings
            .values()
            .any(|b| b.status.is_active() && matches(b))
    }

    fn details(&self, booking: &Booking, with_customer: bool) -> BookingDetails {
        let customer = if with_customer {
            booking
                .customer_id
                .and_then(|id| self.users.get(&id))
                .map(|u| CustomerSummary {
                    name: u.name.clone(),
                    email: u.email.clone(),
                })
        } else {
            None
        };
        let vehicle = booking
            .vehicle_id
            .and_then(|id| self.vehicles.get(&id))
            .map(VehicleSummary::from);

        BookingDetails {
            booking: booking.clone(),
            customer,
            vehicle,
        }
    }
}

/// Shared in-memory database
///
/// Cloning is cheap and every clone sees the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// User repository over this store
    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    /// Vehicle repository over this store
    pub fn vehicles(&self) -> MemoryVehicleRepository {
        MemoryVehicleRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    /// Booking repository over this store
    pub fn bookings(&self) -> MemoryBookingRepository {
        MemoryBookingRepository {
            tables: Arc::clone(&self.tables),
        }
    }
}

/// In-memory implementation of UserRepository
pub struct MemoryUserRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl Repository<User, i32> for MemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.lock().users.values().cloned().collect())
    }

    async fn create(&self, entity: &User) -> AppResult<User> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.email == entity.email) {
            return Err(AppError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            created_at: now,
            updated_at: now,
            ..entity.clone()
        };
        tables.users.insert(user.id, user.clone());

        debug!("Stored user {}", user.id);
        Ok(user)
    }

    async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if tables.has_active_booking(|b| b.customer_id == Some(id)) {
            return Ok(DeleteOutcome::HasActiveBookings);
        }

        tables.users.remove(&id);
        for booking in tables.bookings.values_mut() {
            if booking.customer_id == Some(id) {
                booking.customer_id = None;
            }
        }

        info!("Deleted user {}", id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut tables = self.tables.lock();
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::UserNotFound(user.id.to_string()))?;
        *stored = User {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..user.clone()
        };

        Ok(stored.clone())
    }
}

/// In-memory implementation of VehicleRepository
pub struct MemoryVehicleRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl Repository<Vehicle, i32> for MemoryVehicleRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        Ok(self.tables.lock().vehicles.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.tables.lock().vehicles.values().cloned().collect())
    }

    async fn create(&self, entity: &Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock();
        if tables
            .vehicles
            .values()
            .any(|v| v.registration_number == entity.registration_number)
        {
            return Err(AppError::AlreadyExists(
                "Registration number already exists".to_string(),
            ));
        }

        tables.last_vehicle_id += 1;
        let vehicle = Vehicle {
            id: tables.last_vehicle_id,
            ..entity.clone()
        };
        tables.vehicles.insert(vehicle.id, vehicle.clone());

        debug!("Stored vehicle {}", vehicle.id);
        Ok(vehicle)
    }

    async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        let mut tables = self.tables.lock();
        if !tables.vehicles.contains_key(&id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if tables.has_active_booking(|b| b.vehicle_id == Some(id)) {
            return Ok(DeleteOutcome::HasActiveBookings);
        }

        tables.vehicles.remove(&id);
        for booking in tables.bookings.values_mut() {
            if booking.vehicle_id == Some(id) {
                booking.vehicle_id = None;
            }
        }

        info!("Deleted vehicle {}", id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl VehicleRepository for MemoryVehicleRepository {
    async fn find_by_registration(&self, registration_number: &str) -> AppResult<Option<Vehicle>> {
        Ok(self
            .tables
            .lock()
            .vehicles
            .values()
            .find(|v| v.registration_number == registration_number)
            .cloned())
    }

    async fn apply_patch(&self, id: i32, patch: &VehiclePatch) -> AppResult<Option<Vehicle>> {
        let mut tables = self.tables.lock();
        let Some(current) = tables.vehicles.get(&id) else {
            return Ok(None);
        };

        if patch.availability_status.is_some()
            && tables.has_active_booking(|b| b.vehicle_id == Some(id))
        {
            return Err(AppError::Conflict(
                "Vehicle has an active booking; availability follows the booking".to_string(),
            ));
        }

        let mut updated = current.clone();
        patch.apply_to(&mut updated);

        if tables
            .vehicles
            .values()
            .any(|v| v.id != id && v.registration_number == updated.registration_number)
        {
            return Err(AppError::AlreadyExists(
                "Registration number already exists".to_string(),
            ));
        }

        tables.vehicles.insert(id, updated.clone());
        Ok(Some(updated))
    }
}

/// In-memory implementation of BookingRepository
pub struct MemoryBookingRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Booking>> {
        Ok(self.tables.lock().bookings.get(&id).cloned())
    }

    async fn list_for_customer(&self, customer_id: i32) -> AppResult<Vec<BookingDetails>> {
        let tables = self.tables.lock();
        Ok(tables
            .bookings
            .values()
            .rev()
            .filter(|b| b.customer_id == Some(customer_id))
            .map(|b| tables.details(b, false))
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<BookingDetails>> {
        let tables = self.tables.lock();
        Ok(tables
            .bookings
            .values()
            .rev()
            .map(|b| tables.details(b, true))
            .collect())
    }

    async fn create_reserving_vehicle(&self, booking: &NewBooking) -> AppResult<Booking> {
        let mut tables = self.tables.lock();

        if !tables.users.contains_key(&booking.customer_id) {
            return Err(AppError::UserNotFound(
                "customer does not exist".to_string(),
            ));
        }

        let vehicle = tables
            .vehicles
            .get_mut(&booking.vehicle_id)
            .ok_or_else(|| AppError::VehicleNotFound(booking.vehicle_id.to_string()))?;
        if !vehicle.availability_status.is_available() {
            return Err(AppError::VehicleUnavailable(
                "vehicle not available".to_string(),
            ));
        }
        vehicle.availability_status = AvailabilityStatus::Booked;

        tables.last_booking_id += 1;
        let now = Utc::now();
        let created = Booking {
            id: tables.last_booking_id,
            customer_id: Some(booking.customer_id),
            vehicle_id: Some(booking.vehicle_id),
            rent_start_date: booking.rent_start_date,
            rent_end_date: booking.rent_end_date,
            total_price: booking.total_price,
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(created.id, created.clone());

        info!(
            "Created booking {} for vehicle {}",
            created.id, booking.vehicle_id
        );
        Ok(created)
    }

    async fn transition(
        &self,
        id: i32,
        from: BookingStatus,
        to: BookingStatus,
        release_vehicle: bool,
    ) -> AppResult<(Booking, Option<Vehicle>)> {
        let mut tables = self.tables.lock();

        let booking = match tables.bookings.get_mut(&id) {
            Some(b) if b.status == from => b,
            _ => {
                return Err(AppError::InvalidTransition(format!(
                    "Booking is no longer {}",
                    from
                )))
            }
        };
        booking.status = to;
        booking.updated_at = Utc::now();
        let booking = booking.clone();

        let vehicle = match (release_vehicle, booking.vehicle_id) {
            (true, Some(vehicle_id)) => tables.vehicles.get_mut(&vehicle_id).map(|v| {
                v.availability_status = AvailabilityStatus::Available;
                v.clone()
            }),
            _ => None,
        };

        info!("Booking {} moved from {} to {}", id, from, to);
        Ok((booking, vehicle))
    }
}
