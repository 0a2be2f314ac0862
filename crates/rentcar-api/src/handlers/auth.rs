//! Authentication handlers
//!
//! Signup, login and the caller's own profile.

use crate::dto::auth::{LoginRequest, LoginResponse, SignupRequest};
use crate::dto::ApiResponse;
use actix_web::{cookie::Cookie, web, HttpResponse};
use rentcar_auth::{AuthenticatedUser, JwtService};
use rentcar_core::AppError;
use rentcar_services::{NewUser, UserService};
use tracing::{debug, instrument, warn};
use validator::Validate;

/// Register a new account
///
/// POST /api/v1/auth/signup (also POST /api/v1/users)
#[instrument(skip(users, req))]
pub async fn signup(
    users: web::Data<UserService>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Signup validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let user = users.register(NewUser::try_from(req.into_inner())?).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        user,
        "User registered successfully",
    )))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(users, jwt_service, req))]
pub async fn login(
    users: web::Data<UserService>,
    jwt_service: web::Data<JwtService>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let result = users.login(&req.email, &req.password).await?;
    let expires_in = jwt_service.expiration_secs();

    let cookie = Cookie::build("token", result.token.clone())
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::with_message(
        LoginResponse::new(result.token, expires_in, result.user),
        "Login successful",
    )))
}

/// Get current user info
///
/// GET /api/v1/auth/me
#[instrument(skip(users, user))]
pub async fn me(
    users: web::Data<UserService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    debug!(user_id = user.user_id, "Getting current user info");

    let info = users.get(user.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(info, "Fetch successfully")))
}

/// Configure authentication routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}
