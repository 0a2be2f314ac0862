//! Schema bootstrap
//!
//! Creates the `users`, `vehicles` and `bookings` tables when absent. Every
//! statement is idempotent so this runs on each startup.

use rentcar_core::{AppError, AppResult};
use sqlx::PgPool;
use tracing::{error, info};

/// Name of the partial unique index allowing one active booking per vehicle
pub(crate) const ONE_ACTIVE_PER_VEHICLE: &str = "bookings_one_active_per_vehicle";

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password_hash TEXT NOT NULL,
        phone VARCHAR(50) NOT NULL,
        role VARCHAR(20) NOT NULL DEFAULT 'customer',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_email_key UNIQUE (email),
        CONSTRAINT users_email_lowercase CHECK (email = LOWER(email)),
        CONSTRAINT users_role_check CHECK (role IN ('customer', 'admin'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id SERIAL PRIMARY KEY,
        vehicle_name VARCHAR(255) NOT NULL,
        type VARCHAR(50) NOT NULL,
        registration_number VARCHAR(100) NOT NULL,
        daily_rent_price BIGINT NOT NULL,
        availability_status VARCHAR(20) NOT NULL DEFAULT 'available',
        CONSTRAINT vehicles_registration_number_key UNIQUE (registration_number),
        CONSTRAINT vehicles_price_positive CHECK (daily_rent_price > 0),
        CONSTRAINT vehicles_availability_check
            CHECK (availability_status IN ('available', 'booked'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id SERIAL PRIMARY KEY,
        customer_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        vehicle_id INTEGER REFERENCES vehicles(id) ON DELETE SET NULL,
        rent_start_date DATE NOT NULL,
        rent_end_date DATE NOT NULL,
        total_price BIGINT NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'active',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT bookings_dates_ordered CHECK (rent_end_date > rent_start_date),
        CONSTRAINT bookings_price_non_negative CHECK (total_price >= 0),
        CONSTRAINT bookings_status_check
            CHECK (status IN ('active', 'cancelled', 'returned'))
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS bookings_one_active_per_vehicle
        ON bookings (vehicle_id)
        WHERE status = 'active'
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bookings_customer ON bookings (customer_id)",
];

/// Create tables and indexes if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> AppResult<()> {
    let mut tx = pool.begin().await.map_err(|e| {
        error!("Failed to start schema transaction: {}", e);
        AppError::Transaction(format!("Failed to start transaction: {}", e))
    })?;

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Schema statement failed: {}", e);
                AppError::Database(format!("Failed to create schema: {}", e))
            })?;
    }

    tx.commit().await.map_err(|e| {
        error!("Failed to commit schema: {}", e);
        AppError::Transaction(format!("Failed to commit transaction: {}", e))
    })?;

    info!("Database schema ready");
    Ok(())
}
