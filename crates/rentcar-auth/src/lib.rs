//! Authentication and authorization for RentCar
//!
//! This crate provides JWT-based authentication, password hashing with Argon2,
//! and Actix-web extractors for role-based access control.
//!
//! # Features
//!
//! - JWT token creation and validation
//! - Argon2 password hashing and verification
//! - Request extractors for authenticated users and admins
//!
//! # Examples
//!
//! ## Using extractors in Actix-web
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use rentcar_auth::middleware::{AdminUser, AuthenticatedUser};
//!
//! async fn protected_route(user: AuthenticatedUser) -> HttpResponse {
//!     HttpResponse::Ok().json(serde_json::json!({ "user_id": user.user_id }))
//! }
//!
//! async fn admin_route(_admin: AdminUser) -> HttpResponse {
//!     HttpResponse::Ok().finish()
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use password::PasswordService;

#[cfg(test)]
mod tests {
    use super::*;
    use rentcar_core::models::{User, UserRole};

    #[test]
    fn test_integration_jwt_and_password() {
        let password_service = PasswordService::with_cost(1).unwrap();
        let jwt_service = JwtService::new("test-secret-key-12345", 3600);

        let hash = password_service.hash_password("my_secure_password").unwrap();
        assert!(password_service
            .verify_password("my_secure_password", &hash)
            .unwrap());

        let user = User {
            id: 11,
            email: "lee@example.com".to_string(),
            password_hash: hash,
            role: UserRole::Admin,
            ..Default::default()
        };
        let token = jwt_service.create_token_for_user(&user).unwrap();
        let decoded = jwt_service.validate_token(&token).unwrap();

        assert_eq!(decoded.user_id().unwrap(), 11);
        assert_eq!(decoded.role, UserRole::Admin);
        assert!(!token.contains("argon2"));
    }
}
