//! RentCar backend server
//!
//! Vehicle rental API: accounts, inventory and bookings.

use actix_cors::Cors;
use actix_web::{http::header, middleware, App, HttpServer};
use rentcar_api::{AppState, Repositories};
use rentcar_auth::{JwtService, PasswordService};
use rentcar_core::config::{AppConfig, StorageBackend};
use rentcar_core::AppError;
use rentcar_db::{create_pool, ensure_schema, MemoryStore};
use std::env;
use std::io;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rentcar={lvl},rentcar_api={lvl},rentcar_services={lvl},rentcar_db={lvl},rentcar_auth={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();
}

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    error!("Startup failed: {}", err);
    io::Error::other(err.to_string())
}

async fn build_repositories(config: &AppConfig) -> Result<Repositories, AppError> {
    match config.storage {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database).await?;
            ensure_schema(&pool).await?;
            info!(
                max_connections = config.database.max_connections,
                "Database ready"
            );
            Ok(Repositories::postgres(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Repositories::memory(&MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting RentCar backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().map_err(startup_error)?;

    let repositories = build_repositories(&config).await.map_err(startup_error)?;
    let passwords = PasswordService::with_cost(config.auth.hash_cost).map_err(startup_error)?;
    let jwt_service = JwtService::new(&config.auth.jwt_secret, config.auth.jwt_expiration_secs);

    info!(
        "JWT service configured with {} second token expiration",
        config.auth.jwt_expiration_secs
    );

    let state = AppState::new(repositories, passwords, jwt_service);
    let cors_origins = config.cors_origins();
    let bind_addr = config.server_addr();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await
}
