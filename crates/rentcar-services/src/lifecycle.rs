//! Booking lifecycle rules
//!
//! Pure functions shared by the booking service: date parsing, pricing and
//! the role-scoped transition table. Nothing here touches storage, so the
//! rules can be checked against a fixed clock.
//!
//! ```text
//! active --cancel--> cancelled
//! active --return--> returned
//! ```
//!
//! Both targets are terminal.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rentcar_core::models::{Booking, BookingStatus, Principal};
use rentcar_core::{AppError, AppResult};

/// Parse a rental date, accepting `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are truncated to their calendar day in UTC.
pub fn parse_rental_date(field: &str, raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::MissingField(field.to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| {
            AppError::Validation(format!(
                "{} must be a date (YYYY-MM-DD) or RFC 3339 timestamp",
                field
            ))
        })
}

/// Number of billed days between two calendar dates.
///
/// The end must be strictly after the start; zero or negative durations are
/// rejected rather than billed.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> AppResult<i64> {
    let days = (end - start).num_days();
    if days <= 0 {
        return Err(AppError::Validation(
            "rent_end_date must be after rent_start_date".to_string(),
        ));
    }
    Ok(days)
}

/// Price of a rental, fixed at creation
pub fn total_price(days: i64, daily_rent_price: i64) -> AppResult<i64> {
    days.checked_mul(daily_rent_price)
        .ok_or_else(|| AppError::Validation("Rental period is too long".to_string()))
}

/// Whether moving `from` -> `to` gives the vehicle back
pub fn releases_vehicle(from: BookingStatus, to: BookingStatus) -> bool {
    from.is_active() && to.is_terminal()
}

/// Decide whether `principal` may move `booking` to `requested`.
///
/// Returns the target status on success. `now` is the instant used for the
/// "already started" check: a rental starts at midnight UTC of its first day.
pub fn authorize_transition(
    booking: &Booking,
    requested: &str,
    principal: &Principal,
    now: DateTime<Utc>,
) -> AppResult<BookingStatus> {
    if principal.is_admin() {
        let target = parse_status(requested)?;

        if target.is_active() {
            return Err(if booking.status.is_active() {
                AppError::InvalidTransition("Booking is already active".to_string())
            } else {
                AppError::InvalidTransition(format!(
                    "Booking is {}; reactivation is not allowed",
                    booking.status
                ))
            });
        }
        if !booking.status.is_active() {
            return Err(AppError::InvalidTransition(format!(
                "Booking is not active (currently {})",
                booking.status
            )));
        }

        return Ok(target);
    }

    if !booking.is_owned_by(principal.user_id) {
        return Err(AppError::Forbidden(
            "You can only update your own bookings".to_string(),
        ));
    }

    let target = parse_status(requested)?;
    if target != BookingStatus::Cancelled {
        return Err(AppError::Forbidden(
            "Customers can only cancel bookings".to_string(),
        ));
    }
    if !booking.status.is_active() {
        return Err(AppError::InvalidTransition(
            "Cannot cancel a booking that is not active".to_string(),
        ));
    }
    if rental_start(booking) <= now {
        return Err(AppError::InvalidTransition(
            "Cannot cancel a booking that has already started".to_string(),
        ));
    }

    Ok(target)
}

fn parse_status(requested: &str) -> AppResult<BookingStatus> {
    BookingStatus::from_str(requested).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid status '{}': expected active, cancelled or returned",
            requested
        ))
    })
}

fn rental_start(booking: &Booking) -> DateTime<Utc> {
    booking.rent_start_date.and_time(NaiveTime::MIN).and_utc()
}
