//! Vehicle inventory handlers

use crate::dto::vehicle::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use rentcar_auth::{AdminUser, AuthenticatedUser};
use rentcar_core::models::VehiclePatch;
use rentcar_core::AppError;
use rentcar_services::{NewVehicle, VehicleService};
use tracing::{instrument, warn};
use validator::Validate;

/// Add a vehicle
///
/// POST /api/v1/vehicles
#[instrument(skip(vehicles, _admin, req))]
pub async fn create_vehicle(
    vehicles: web::Data<VehicleService>,
    _admin: AdminUser,
    req: web::Json<CreateVehicleRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Vehicle creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let vehicle = vehicles
        .create(NewVehicle::try_from(req.into_inner())?)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        vehicle,
        "Vehicle created successfully",
    )))
}

/// List vehicles
///
/// GET /api/v1/vehicles
#[instrument(skip(vehicles, _user))]
pub async fn list_vehicles(
    vehicles: web::Data<VehicleService>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let list = vehicles.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        list,
        "Vehicles fetched successfully",
    )))
}

/// GET /api/v1/vehicles/{id}
#[instrument(skip(vehicles, _user))]
pub async fn get_vehicle(
    vehicles: web::Data<VehicleService>,
    path: web::Path<i32>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let vehicle = vehicles.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        vehicle,
        "Vehicle fetched successfully",
    )))
}

/// PUT /api/v1/vehicles/{id}
#[instrument(skip(vehicles, _admin, req))]
pub async fn update_vehicle(
    vehicles: web::Data<VehicleService>,
    path: web::Path<i32>,
    _admin: AdminUser,
    req: web::Json<UpdateVehicleRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Vehicle update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let patch = VehiclePatch::try_from(req.into_inner())?;
    let vehicle = vehicles.update(path.into_inner(), patch).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        vehicle,
        "Vehicle updated successfully",
    )))
}

/// DELETE /api/v1/vehicles/{id}
#[instrument(skip(vehicles, _admin))]
pub async fn delete_vehicle(
    vehicles: web::Data<VehicleService>,
    path: web::Path<i32>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    vehicles.remove(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Vehicle deleted successfully")))
}

/// Configure vehicle routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vehicles")
            .route("", web::get().to(list_vehicles))
            .route("", web::post().to(create_vehicle))
            .route("/{id}", web::get().to(get_vehicle))
            .route("/{id}", web::put().to(update_vehicle))
            .route("/{id}", web::delete().to(delete_vehicle)),
    );
}
