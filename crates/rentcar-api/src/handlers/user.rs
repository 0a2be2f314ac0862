//! User management handlers

use crate::dto::user::UpdateUserRequest;
use crate::dto::ApiResponse;
use crate::handlers::auth::signup;
use actix_web::{web, HttpResponse};
use rentcar_auth::{AdminUser, AuthenticatedUser};
use rentcar_core::AppError;
use rentcar_services::{UserChanges, UserService};
use tracing::{debug, instrument, warn};
use validator::Validate;

/// List users
///
/// GET /api/v1/users
#[instrument(skip(users, _admin))]
pub async fn list_users(
    users: web::Data<UserService>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let list = users.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        list,
        "Users retrieved successfully",
    )))
}

/// Get one user
///
/// GET /api/v1/users/{id}
#[instrument(skip(users, _admin))]
pub async fn get_user(
    users: web::Data<UserService>,
    path: web::Path<i32>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let user = users.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(user, "Fetch successfully")))
}

/// Update a user (admin, or the user themselves)
///
/// PUT /api/v1/users/{id}
#[instrument(skip(users, caller, req))]
pub async fn update_user(
    users: web::Data<UserService>,
    path: web::Path<i32>,
    caller: AuthenticatedUser,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("User update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let id = path.into_inner();
    debug!(user_id = id, caller = caller.user_id, "Updating user");

    let changes = UserChanges::try_from(req.into_inner())?;
    let user = users.update(id, changes, &caller.principal()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(user, "Updated successfully")))
}

/// Delete a user without active bookings
///
/// DELETE /api/v1/users/{id}
#[instrument(skip(users, _admin))]
pub async fn delete_user(
    users: web::Data<UserService>,
    path: web::Path<i32>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    users.remove(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message_only("User deleted successfully")))
}

/// Configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(signup))
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
