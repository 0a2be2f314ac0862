//! User management DTOs

use crate::dto::auth::parse_role;
use rentcar_core::AppError;
use rentcar_services::UserChanges;
use serde::Deserialize;
use validator::Validate;

/// Partial user update; omitted fields are kept
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password; the stored hash is kept when absent
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub phone: Option<String>,

    pub role: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserChanges {
    type Error = AppError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(UserChanges {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            role: req.role.as_deref().map(parse_role).transpose()?,
        })
    }
}
