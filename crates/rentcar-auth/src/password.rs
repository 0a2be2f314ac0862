//! Password hashing and verification using Argon2
//!
//! Passwords are hashed with Argon2id and a random salt; the stored value
//! is the PHC string, which embeds the parameters used.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use rentcar_core::error::AppError;
use tracing::{debug, error};

/// Default work factor
pub const DEFAULT_HASH_COST: u32 = 10;

/// Password hashing service using Argon2
///
/// The work factor is the Argon2 iteration count; memory and parallelism
/// stay at the crate defaults.
#[derive(Debug, Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Create a password service with the default work factor
    ///
    /// # Examples
    ///
    /// ```
    /// use rentcar_auth::PasswordService;
    ///
    /// let password_service = PasswordService::new();
    /// ```
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_HASH_COST).unwrap_or_else(|_| Self {
            argon2: Argon2::default(),
        })
    }

    /// Create a password service with an explicit work factor
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if Argon2 rejects the parameters
    pub fn with_cost(cost: u32) -> Result<Self, AppError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            cost.max(1),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid password hash cost: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password using Argon2
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty password and
    /// `AppError::PasswordHash` if hashing fails
    ///
    /// # Examples
    ///
    /// ```
    /// use rentcar_auth::PasswordService;
    ///
    /// let password_service = PasswordService::with_cost(1)?;
    /// let hash = password_service.hash_password("my_secure_password")?;
    /// assert!(hash.starts_with("$argon2id"));
    /// # Ok::<(), rentcar_core::error::AppError>(())
    /// ```
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        debug!("Hashing password");

        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::PasswordHash(format!("Password hashing failed: {}", e))
            })?;

        Ok(password_hash.to_string())
    }

    /// Verify a password against a hash
    ///
    /// Returns `Ok(false)` for a wrong or empty password.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PasswordHash` if the stored hash is malformed
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        if password.is_empty() {
            return Ok(false);
        }

        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "Failed to parse password hash");
            AppError::PasswordHash(format!("Invalid password hash format: {}", e))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Password verification error");
                Err(AppError::PasswordHash(format!(
                    "Password verification failed: {}",
                    e
                )))
            }
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}
