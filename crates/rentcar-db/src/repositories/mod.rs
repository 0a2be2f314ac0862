//! Repository implementations
//!
//! Concrete PostgreSQL implementations of the repository traits defined in
//! rentcar-core, using sqlx.

pub mod booking_repo;
pub mod user_repo;
pub mod vehicle_repo;

pub use booking_repo::PgBookingRepository;
pub use user_repo::PgUserRepository;
pub use vehicle_repo::PgVehicleRepository;

use crate::schema::ONE_ACTIVE_PER_VEHICLE;
use rentcar_core::AppError;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Translate a sqlx error into the application taxonomy.
///
/// Constraint violations become client errors named after the constraint;
/// anything else is a storage failure.
pub(crate) fn map_db_error(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        let constraint = db.constraint().unwrap_or_default();
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return match constraint {
                    "users_email_key" => {
                        AppError::AlreadyExists("Email already registered".to_string())
                    }
                    "vehicles_registration_number_key" => AppError::AlreadyExists(
                        "Registration number already exists".to_string(),
                    ),
                    c if c == ONE_ACTIVE_PER_VEHICLE => {
                        AppError::VehicleUnavailable("vehicle not available".to_string())
                    }
                    _ => AppError::AlreadyExists(format!("{}: duplicate value", context)),
                };
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return match constraint {
                    "bookings_customer_id_fkey" => {
                        AppError::UserNotFound("customer does not exist".to_string())
                    }
                    "bookings_vehicle_id_fkey" => {
                        AppError::VehicleNotFound("vehicle does not exist".to_string())
                    }
                    _ => AppError::NotFound(format!("{}: referenced row missing", context)),
                };
            }
            _ => {}
        }
    }

    error!("Database error ({}): {}", context, e);
    AppError::Database(format!("{}: {}", context, e))
}

/// Map a failure to open a transaction
pub(crate) fn begin_error(e: sqlx::Error) -> AppError {
    error!("Failed to start transaction: {}", e);
    AppError::Transaction(format!("Failed to start transaction: {}", e))
}

/// Map a failure to commit a transaction
pub(crate) fn commit_error(e: sqlx::Error) -> AppError {
    error!("Failed to commit transaction: {}", e);
    AppError::Transaction(format!("Failed to commit transaction: {}", e))
}
