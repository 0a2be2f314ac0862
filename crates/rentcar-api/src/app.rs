//! Application wiring
//!
//! Builds the services from a set of repositories and registers them,
//! together with the routes and extractor error handlers, on an Actix
//! `ServiceConfig`. The server binary and the HTTP tests share this.

use crate::handlers::{configure_auth, configure_bookings, configure_users, configure_vehicles};
use actix_web::{web, HttpResponse};
use rentcar_auth::{JwtService, PasswordService};
use rentcar_core::traits::{BookingRepository, UserRepository, VehicleRepository};
use rentcar_core::AppError;
use rentcar_db::{
    MemoryStore, PgBookingRepository, PgPool, PgUserRepository, PgVehicleRepository,
};
use rentcar_services::{BookingService, UserService, VehicleService};
use std::sync::Arc;

/// Storage backends for the three services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

impl Repositories {
    /// PostgreSQL repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(pool)),
        }
    }

    /// Repositories over a process-local store
    pub fn memory(store: &MemoryStore) -> Self {
        Self {
            users: Arc::new(store.users()),
            vehicles: Arc::new(store.vehicles()),
            bookings: Arc::new(store.bookings()),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: web::Data<UserService>,
    pub vehicles: web::Data<VehicleService>,
    pub bookings: web::Data<BookingService>,
    pub jwt: web::Data<JwtService>,
}

impl AppState {
    pub fn new(repos: Repositories, passwords: PasswordService, jwt: JwtService) -> Self {
        Self {
            users: web::Data::new(UserService::new(repos.users, passwords, jwt.clone())),
            vehicles: web::Data::new(VehicleService::new(repos.vehicles.clone())),
            bookings: web::Data::new(BookingService::new(repos.bookings, repos.vehicles)),
            jwt: web::Data::new(jwt),
        }
    }

    /// Register state, routes and error handlers
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.vehicles.clone())
            .app_data(self.bookings.clone())
            .app_data(self.jwt.clone())
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health_check))
                    .configure(configure_auth)
                    .configure(configure_users)
                    .configure(configure_vehicles)
                    .configure(configure_bookings),
            )
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
            .default_service(web::route().to(not_found));
    }
}

/// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "healthy",
        "data": {
            "service": "rentcar",
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}
