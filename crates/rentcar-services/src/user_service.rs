//! User directory service
//!
//! Registration, login, profile maintenance and guarded deletion.

use rentcar_auth::{JwtService, PasswordService};
use rentcar_core::{
    models::{Principal, User, UserInfo, UserRole},
    traits::{DeleteOutcome, UserRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration input
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: Option<UserRole>,
}

/// Profile update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub user: UserInfo,
}

/// User management service
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: PasswordService,
    jwt: JwtService,
}

impl UserService {
    /// Create a new user service
    pub fn new(users: Arc<dyn UserRepository>, passwords: PasswordService, jwt: JwtService) -> Self {
        Self {
            users,
            passwords,
            jwt,
        }
    }

    /// Register a new account
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: NewUser) -> AppResult<UserInfo> {
        let name = required("name", &input.name)?;
        let phone = required("phone", &input.phone)?;
        let email = normalize_email(&input.email)?;
        check_password(&input.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Registration rejected: email already registered");
            return Err(AppError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let password_hash = self.passwords.hash_password(&input.password)?;

        let user = self
            .users
            .create(&User {
                name,
                email,
                password_hash,
                phone,
                role: input.role.unwrap_or_default(),
                ..Default::default()
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user.into())
    }

    /// Exchange credentials for a token
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let user = match self.users.find_by_email(&email.trim().to_lowercase()).await? {
            Some(user) => user,
            None => {
                warn!("Login failed: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.passwords.verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt.create_token_for_user(&user)?;
        info!(user_id = user.id, "User logged in");

        Ok(LoginResult {
            token,
            user: user.into(),
        })
    }

    /// List every user (public projection)
    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<UserInfo>> {
        let users = self.users.find_all().await?;
        debug!("Fetched {} users", users.len());
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    /// Get one user
    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> AppResult<UserInfo> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserInfo::from)
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Update a user on behalf of `caller`
    ///
    /// Customers may edit only their own record and never their role.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i32,
        changes: UserChanges,
        caller: &Principal,
    ) -> AppResult<UserInfo> {
        if !caller.is_admin() && caller.user_id != id {
            warn!(caller = caller.user_id, target = id, "Cross-account update rejected");
            return Err(AppError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }

        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))?;

        if let Some(role) = changes.role {
            if role != user.role && !caller.is_admin() {
                return Err(AppError::Forbidden(
                    "Only an admin can change roles".to_string(),
                ));
            }
            user.role = role;
        }

        if let Some(name) = changes.name {
            user.name = required("name", &name)?;
        }
        if let Some(phone) = changes.phone {
            user.phone = required("phone", &phone)?;
        }

        if let Some(email) = changes.email {
            let email = normalize_email(&email)?;
            if email != user.email {
                if let Some(other) = self.users.find_by_email(&email).await? {
                    if other.id != id {
                        return Err(AppError::AlreadyExists(
                            "Email already registered".to_string(),
                        ));
                    }
                }
                user.email = email;
            }
        }

        if let Some(password) = changes.password {
            check_password(&password)?;
            user.password_hash = self.passwords.hash_password(&password)?;
            debug!("Password rotated");
        }

        let updated = self.users.update(&user).await?;
        info!(user_id = id, by = caller.user_id, "User updated");
        Ok(updated.into())
    }

    /// Delete a user without active bookings
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        match self.users.delete(id).await? {
            DeleteOutcome::Deleted => {
                info!(user_id = id, "User deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(AppError::UserNotFound(id.to_string())),
            DeleteOutcome::HasActiveBookings => {
                warn!(user_id = id, "Delete rejected: active bookings");
                Err(AppError::Conflict(
                    "Cannot delete user with active bookings".to_string(),
                ))
            }
        }
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::MissingField(field.to_string()));
    }
    Ok(value.to_string())
}

/// Emails must arrive lowercase; the stored form is trimmed
fn normalize_email(raw: &str) -> AppResult<String> {
    let email = required("email", raw)?;
    if email.chars().any(char::is_uppercase) {
        return Err(AppError::Validation("Email must be lowercase".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Email is not valid".to_string()));
    }
    Ok(email)
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentcar_core::models::{NewBooking, Vehicle};
    use rentcar_core::traits::{BookingRepository, Repository};
    use rentcar_db::MemoryStore;

    fn service(store: &MemoryStore) -> UserService {
        UserService::new(
            Arc::new(store.users()),
            PasswordService::with_cost(1).unwrap(),
            JwtService::new("user-service-secret", 3600),
        )
    }

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Sam".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: "555-0100".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_customer() {
        let store = MemoryStore::new();
        let info = service(&store)
            .register(new_user("sam@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(info.role, UserRole::Customer);
        assert_eq!(info.email, "sam@example.com");

        let stored = store.users().find_by_id(info.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2id"));
    }

    #[tokio::test]
    async fn test_short_password_creates_nothing() {
        let store = MemoryStore::new();
        let err = service(&store)
            .register(new_user("sam@example.com", "12345"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.users().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uppercase_email_rejected() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.register(new_user("a@x.com", "secret1")).await.unwrap();

        let err = svc
            .register(new_user("A@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.register(new_user("a@x.com", "secret1")).await.unwrap();

        let err = svc
            .register(new_user("a@x.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(err.status_code().as_u16(), 409);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = MemoryStore::new();
        let mut input = new_user("a@x.com", "secret1");
        input.name = "  ".to_string();

        let err = service(&store).register(input).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField(_)));
    }

    #[tokio::test]
    async fn test_login() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let info = svc.register(new_user("lo@x.com", "secret1")).await.unwrap();

        let result = svc.login("LO@x.com", "secret1").await.unwrap();
        assert_eq!(result.user.id, info.id);
        assert!(!result.token.is_empty());

        assert!(matches!(
            svc.login("lo@x.com", "wrong-pass").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("nobody@x.com", "secret1").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_customer_updates_only_self_and_not_role() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let me = svc.register(new_user("me@x.com", "secret1")).await.unwrap();
        let other = svc.register(new_user("other@x.com", "secret1")).await.unwrap();
        let caller = Principal::new(me.id, UserRole::Customer);

        let err = svc
            .update(other.id, UserChanges::default(), &caller)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let promote = UserChanges {
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        let err = svc.update(me.id, promote, &caller).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let rename = UserChanges {
            name: Some("Samantha".to_string()),
            ..Default::default()
        };
        let updated = svc.update(me.id, rename, &caller).await.unwrap();
        assert_eq!(updated.name, "Samantha");
        assert_eq!(updated.role, UserRole::Customer);
    }

    #[tokio::test]
    async fn test_password_kept_unless_supplied() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let me = svc.register(new_user("pw@x.com", "secret1")).await.unwrap();
        let admin = Principal::new(999, UserRole::Admin);
        let before = store.users().find_by_id(me.id).await.unwrap().unwrap();

        let phone = UserChanges {
            phone: Some("555-0199".to_string()),
            ..Default::default()
        };
        svc.update(me.id, phone, &admin).await.unwrap();
        let after = store.users().find_by_id(me.id).await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);

        let rotate = UserChanges {
            password: Some("new-secret".to_string()),
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        let updated = svc.update(me.id, rotate, &admin).await.unwrap();
        assert_eq!(updated.role, UserRole::Admin);
        assert!(svc.login("pw@x.com", "new-secret").await.is_ok());
        assert!(svc.login("pw@x.com", "secret1").await.is_err());
    }

    #[tokio::test]
    async fn test_update_email_taken() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let me = svc.register(new_user("one@x.com", "secret1")).await.unwrap();
        svc.register(new_user("two@x.com", "secret1")).await.unwrap();

        let changes = UserChanges {
            email: Some("two@x.com".to_string()),
            ..Default::default()
        };
        let err = svc
            .update(me.id, changes, &Principal::new(me.id, UserRole::Customer))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_remove_blocked_by_active_booking() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let me = svc.register(new_user("rm@x.com", "secret1")).await.unwrap();
        let vehicle = store
            .vehicles()
            .create(&Vehicle {
                vehicle_name: "Fiesta".to_string(),
                vehicle_type: "car".to_string(),
                registration_number: "RM-1".to_string(),
                daily_rent_price: 40,
                ..Default::default()
            })
            .await
            .unwrap();
        let booking = store
            .bookings()
            .create_reserving_vehicle(&NewBooking {
                customer_id: me.id,
                vehicle_id: vehicle.id,
                rent_start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                rent_end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                total_price: 40,
            })
            .await
            .unwrap();

        let err = svc.remove(me.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        store
            .bookings()
            .transition(
                booking.id,
                rentcar_core::models::BookingStatus::Active,
                rentcar_core::models::BookingStatus::Returned,
                true,
            )
            .await
            .unwrap();

        svc.remove(me.id).await.unwrap();
        assert!(matches!(
            svc.get(me.id).await,
            Err(AppError::UserNotFound(_))
        ));
        assert!(matches!(
            svc.remove(me.id).await,
            Err(AppError::UserNotFound(_))
        ));
    }
}
