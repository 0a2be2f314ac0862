//! Authentication DTOs
//!
//! Request and response types for signup and login.

use rentcar_core::models::{UserInfo, UserRole};
use rentcar_core::AppError;
use rentcar_services::NewUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request (public)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 30, message = "Phone is required"))]
    pub phone: String,

    /// `customer` (default) or `admin`
    pub role: Option<String>,
}

impl TryFrom<SignupRequest> for NewUser {
    type Error = AppError;

    fn try_from(req: SignupRequest) -> Result<Self, Self::Error> {
        let role = req.role.as_deref().map(parse_role).transpose()?;
        Ok(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            role,
        })
    }
}

/// Parse a role name supplied by a client
pub fn parse_role(raw: &str) -> Result<UserRole, AppError> {
    UserRole::from_str(raw).ok_or_else(|| {
        AppError::Validation(format!("Invalid role '{}': expected customer or admin", raw))
    })
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT)
    pub token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Token lifetime in seconds
    pub expires_in: i64,

    pub user: UserInfo,
}

impl LoginResponse {
    pub fn new(token: String, expires_in: i64, user: UserInfo) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}
