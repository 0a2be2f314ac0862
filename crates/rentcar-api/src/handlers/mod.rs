//! HTTP request handlers

pub mod auth;
pub mod booking;
pub mod user;
pub mod vehicle;

pub use auth::configure as configure_auth;
pub use booking::configure as configure_bookings;
pub use user::configure as configure_users;
pub use vehicle::configure as configure_vehicles;
