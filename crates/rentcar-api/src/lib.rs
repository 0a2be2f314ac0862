//! API layer for RentCar
//!
//! HTTP handlers for accounts, the vehicle inventory and bookings.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod app;
pub mod dto;
pub mod handlers;

pub use app::{AppState, Repositories};
pub use dto::ApiResponse;
pub use handlers::{configure_auth, configure_bookings, configure_users, configure_vehicles};
