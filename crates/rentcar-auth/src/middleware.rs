//! Actix-web request extractors
//!
//! Provides extractors for authenticated users with role-based access control.
//! Missing or invalid credentials answer 401; a valid token with the wrong
//! role answers 403.

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use rentcar_core::error::AppError;
use rentcar_core::models::{Principal, UserRole};
use tracing::{debug, warn};

/// Extract JWT token from request
///
/// Checks for token in the following order:
/// 1. Authorization header (Bearer token)
/// 2. Cookie named "token"
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.cookie("token").map(|cookie| cookie.value().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_service = req.app_data::<web::Data<JwtService>>().ok_or_else(|| {
        warn!("JwtService not found in app data");
        AppError::Internal("Authentication service not configured".to_string())
    })?;

    let token = extract_token_from_request(req).ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::Unauthorized("No authentication token provided".to_string())
    })?;

    let claims = jwt_service.validate_token(&token)?;
    let user_id = claims.user_id()?;

    debug!(user_id, role = %claims.role, "User authenticated");

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email.clone(),
        role: claims.role,
        claims,
    })
}

/// Authenticated user extractor
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use rentcar_auth::middleware::AuthenticatedUser;
///
/// async fn protected_handler(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().json(serde_json::json!({
///         "user_id": user.user_id,
///         "role": user.role
///     }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Id of the authenticated user
    pub user_id: i32,

    /// Email carried by the token
    pub email: String,

    /// Role of the authenticated user
    pub role: UserRole,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identity passed down to the services
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|e| {
            warn!(error = %e, path = %req.path(), "Authentication failed");
            e.into()
        }))
    }
}

/// Admin user extractor
///
/// Rejects authenticated non-admins with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl std::ops::Deref for AdminUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_user = match AuthenticatedUser::from_request(req, payload).into_inner() {
            Ok(user) => user,
            Err(e) => return ready(Err(e)),
        };

        if !auth_user.is_admin() {
            warn!(
                user_id = auth_user.user_id,
                role = %auth_user.role,
                "User attempted admin access without privileges"
            );
            return ready(Err(AppError::Forbidden(
                "Admin access required".to_string(),
            )
            .into()));
        }

        ready(Ok(AdminUser(auth_user)))
    }
}
