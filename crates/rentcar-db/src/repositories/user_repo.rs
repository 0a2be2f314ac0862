//! User repository implementation
//!
//! Provides PostgreSQL-backed storage for customer and admin accounts.

use super::{begin_error, commit_error, map_db_error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentcar_core::{
    models::{User, UserRole},
    traits::{DeleteOutcome, Repository, UserRepository},
    AppError, AppResult,
};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, instrument};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, phone, role, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse user role from string
    fn parse_role(s: &str) -> UserRole {
        UserRole::from_str(s).unwrap_or_default()
    }
}

#[async_trait]
impl Repository<User, i32> for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find user", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<User>> {
        debug!("Finding all users");

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, entity), fields(email = %entity.email))]
    async fn create(&self, entity: &User) -> AppResult<User> {
        debug!("Creating user");

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, phone, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&entity.name)
        .bind(&entity.email)
        .bind(&entity.password_hash)
        .bind(&entity.phone)
        .bind(entity.role.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("create user", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        debug!("Deleting user: {}", id);

        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        // Row lock serializes against bookings inserted for this customer
        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_db_error("lock user", e))?;

        if exists.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE customer_id = $1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("count active bookings", e))?;

        if active > 0 {
            return Ok(DeleteOutcome::HasActiveBookings);
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("delete user", e))?;

        tx.commit().await.map_err(commit_error)?;

        info!("Deleted user {}", id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        debug!("Finding user by email");

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find user by email", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, user), fields(id = user.id))]
    async fn update(&self, user: &User) -> AppResult<User> {
        debug!("Updating user");

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                password_hash = $4,
                phone = $5,
                role = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update user", e))?;

        row.map(Into::into)
            .ok_or_else(|| AppError::UserNotFound(user.id.to_string()))
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    phone: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            phone: row.phone,
            role: PgUserRepository::parse_role(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(PgUserRepository::parse_role("admin"), UserRole::Admin);
        assert_eq!(PgUserRepository::parse_role("customer"), UserRole::Customer);
        assert_eq!(PgUserRepository::parse_role("invalid"), UserRole::Customer);
    }

    #[test]
    fn test_row_conversion() {
        let now = Utc::now();
        let user: User = UserRow {
            id: 3,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone: "555".to_string(),
            role: "admin".to_string(),
            created_at: now,
            updated_at: now,
        }
        .into();

        assert_eq!(user.id, 3);
        assert!(user.role.is_admin());
    }
}
