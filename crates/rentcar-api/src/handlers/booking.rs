//! Booking handlers
//!
//! Every route requires an authenticated caller; what the caller may see or
//! change is decided by `BookingService` from their role.

use crate::dto::booking::{BookingStatusResponse, CreateBookingRequest, UpdateBookingRequest};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use rentcar_auth::AuthenticatedUser;
use rentcar_core::AppError;
use rentcar_services::{BookingRequest, BookingService};
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Create a booking
///
/// POST /api/v1/bookings
#[instrument(skip(bookings, caller, req), fields(caller = caller.user_id))]
pub async fn create_booking(
    bookings: web::Data<BookingService>,
    caller: AuthenticatedUser,
    req: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Booking validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let request = BookingRequest::try_from(req.into_inner())?;
    let booking = bookings.create(request, &caller.principal()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        booking,
        "Booking created successfully",
    )))
}

/// List bookings visible to the caller
///
/// GET /api/v1/bookings
#[instrument(skip(bookings, caller), fields(caller = caller.user_id))]
pub async fn list_bookings(
    bookings: web::Data<BookingService>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let list = bookings.list(&caller.principal()).await?;
    debug!(count = list.len(), "Bookings listed");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        list,
        "Bookings fetched successfully",
    )))
}

/// Change the status of a booking
///
/// PUT /api/v1/bookings/{id}
#[instrument(skip(bookings, caller, req), fields(caller = caller.user_id))]
pub async fn update_booking(
    bookings: web::Data<BookingService>,
    path: web::Path<i32>,
    caller: AuthenticatedUser,
    req: web::Json<UpdateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Booking update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let outcome = bookings
        .transition(path.into_inner(), &req.status, &caller.principal())
        .await?;
    let message = outcome.message();

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BookingStatusResponse::from(outcome),
        message,
    )))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("", web::get().to(list_bookings))
            .route("/{id}", web::put().to(update_booking)),
    );
}
