//! RentCar Database Layer
//!
//! This crate provides storage for the RentCar backend. It includes:
//!
//! - Connection pool management with sqlx
//! - Idempotent schema bootstrap
//! - PostgreSQL repository implementations for users, vehicles and bookings
//! - An in-memory store implementing the same repository traits
//! - Transaction support for the booking lifecycle

pub mod memory;
pub mod pool;
pub mod repositories;
pub mod schema;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use repositories::*;
pub use schema::ensure_schema;

// Re-export commonly used types
pub use rentcar_core::{AppError, AppResult};
pub use sqlx::PgPool;
