//! Booking lifecycle service
//!
//! Creates bookings against the inventory and drives their status
//! transitions. The availability flag of a vehicle is only ever written
//! here, through the atomic repository operations, so that a vehicle is
//! `booked` exactly while one `active` booking references it.

use crate::lifecycle::{
    authorize_transition, parse_rental_date, releases_vehicle, rental_days, total_price,
};
use chrono::Utc;
use rentcar_core::{
    models::{Booking, BookingDetails, BookingStatus, NewBooking, Principal, Vehicle, VehicleSummary},
    traits::{BookingRepository, VehicleRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Booking request as received from the caller
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub rent_start_date: String,
    pub rent_end_date: String,
}

/// Result of a status change
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub booking: Booking,
    /// Vehicle as released by the transition, if it was released
    pub vehicle: Option<Vehicle>,
}

impl TransitionOutcome {
    /// Message for the response envelope
    pub fn message(&self) -> &'static str {
        match self.booking.status {
            BookingStatus::Cancelled => "Booking cancelled successfully",
            BookingStatus::Returned => "Booking marked as returned. Vehicle is now available",
            BookingStatus::Active => "Booking updated successfully",
        }
    }
}

/// Booking lifecycle service
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, vehicles: Arc<dyn VehicleRepository>) -> Self {
        Self { bookings, vehicles }
    }

    /// Book a vehicle
    ///
    /// Customers book for themselves; an admin may book for any customer.
    /// The price is fixed here and never recomputed.
    #[instrument(skip(self, request), fields(vehicle_id = request.vehicle_id, caller = caller.user_id))]
    pub async fn create(
        &self,
        request: BookingRequest,
        caller: &Principal,
    ) -> AppResult<BookingDetails> {
        if !caller.is_admin() && request.customer_id != caller.user_id {
            warn!(customer_id = request.customer_id, "Booking on behalf of another customer rejected");
            return Err(AppError::Forbidden(
                "Customers can only book for themselves".to_string(),
            ));
        }

        let start = parse_rental_date("rent_start_date", &request.rent_start_date)?;
        let end = parse_rental_date("rent_end_date", &request.rent_end_date)?;
        let days = rental_days(start, end)?;

        let vehicle = self
            .vehicles
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::VehicleNotFound(request.vehicle_id.to_string()))?;

        if !vehicle.availability_status.is_available() {
            return Err(AppError::VehicleUnavailable(
                "vehicle not available".to_string(),
            ));
        }

        let price = total_price(days, vehicle.daily_rent_price)?;
        debug!(days, price, "Priced booking");

        // The store re-checks availability while flipping it
        let booking = self
            .bookings
            .create_reserving_vehicle(&NewBooking {
                customer_id: request.customer_id,
                vehicle_id: vehicle.id,
                rent_start_date: start,
                rent_end_date: end,
                total_price: price,
            })
            .await?;

        info!(
            booking_id = booking.id,
            customer_id = request.customer_id,
            total_price = booking.total_price,
            "Booking created"
        );

        Ok(BookingDetails {
            booking,
            customer: None,
            vehicle: Some(VehicleSummary::from(&vehicle)),
        })
    }

    /// Bookings visible to the caller, newest first
    #[instrument(skip(self), fields(caller = caller.user_id))]
    pub async fn list(&self, caller: &Principal) -> AppResult<Vec<BookingDetails>> {
        let bookings = if caller.is_admin() {
            self.bookings.list_all().await?
        } else {
            self.bookings.list_for_customer(caller.user_id).await?
        };
        debug!("Fetched {} bookings", bookings.len());
        Ok(bookings)
    }

    /// Change the status of a booking
    #[instrument(skip(self), fields(caller = caller.user_id))]
    pub async fn transition(
        &self,
        id: i32,
        requested: &str,
        caller: &Principal,
    ) -> AppResult<TransitionOutcome> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        let target = authorize_transition(&booking, requested, caller, Utc::now()).map_err(|e| {
            warn!(booking_id = id, error = %e, "Transition rejected");
            e
        })?;

        let (booking, vehicle) = self
            .bookings
            .transition(id, booking.status, target, releases_vehicle(booking.status, target))
            .await?;

        info!(booking_id = id, status = %booking.status, "Booking status changed");
        Ok(TransitionOutcome { booking, vehicle })
    }
}
