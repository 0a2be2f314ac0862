//! Data Transfer Objects (DTOs) for API requests and responses

pub mod auth;
pub mod booking;
pub mod common;
pub mod user;
pub mod vehicle;

pub use common::ApiResponse;
