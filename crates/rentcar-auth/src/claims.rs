//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.

use chrono::{Duration, Utc};
use rentcar_core::models::{User, UserRole};
use rentcar_core::AppError;
use serde::{Deserialize, Serialize};

/// JWT Claims
///
/// `sub` carries the user id as a string, following the JWT convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Email at issue time
    pub email: String,

    /// User role
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims; the expiration is filled in by `JwtService`
    ///
    /// # Examples
    ///
    /// ```
    /// use rentcar_auth::Claims;
    /// use rentcar_core::models::UserRole;
    ///
    /// let claims = Claims::new(7, "ana@example.com", UserRole::Admin);
    /// assert_eq!(claims.sub, "7");
    /// assert_eq!(claims.role, UserRole::Admin);
    /// ```
    pub fn new(user_id: i32, email: &str, role: UserRole) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: Utc::now().timestamp(),
            exp: 0,
        }
    }

    /// Create claims for a stored user
    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, &user.email, user.role)
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(user_id: i32, email: &str, role: UserRole, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Numeric user id from the subject
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::InvalidToken("Subject is not a user id".to_string()))
    }
}
