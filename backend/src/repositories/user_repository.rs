//! Database repository for user management operations.
//!
//! Provides CRUD operations for system users

use crate::{api::common::PaginationFilter, database::models::User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

pub(crate) const USER_COLUMNS: &str = "id, email, password_hash, is_active, verified_email, is_admin, \
     last_login, created_at, updated_at, is_deleted, deleted_at";

/// Repository for user database operations.
///
/// Handles all persistence operations for the User entity. Users are never
/// hard-deleted; every query filters on the soft-delete flag.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID (UUID format)
    ///
    /// # Returns
    /// `Some(User)` if found and not deleted, `None` otherwise
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND is_deleted = 0"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Arguments
    /// * `email` - Email to search for
    ///
    /// # Returns
    /// `Some(User)` if found and not deleted, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? AND is_deleted = 0"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    ///
    /// # Arguments
    /// * `email` - Email to check
    ///
    /// # Returns
    /// `true` if a user with this email exists (and is not deleted)
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE email = ? AND is_deleted = 0",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Retrieves a page of users ordered by email.
    pub async fn list_users(&self, pagination: &PaginationFilter) -> Result<Vec<User>> {
        let limit = pagination.limit();
        let offset = pagination.offset();

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_deleted = 0 \
             ORDER BY email ASC LIMIT ? OFFSET ?"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get total count of users
    pub async fn count_users(&self) -> Result<u64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_deleted = 0")
                .fetch_one(self.pool)
                .await?;

        Ok(count as u64)
    }

    /// Stamps the user's last login.
    ///
    /// Also the implicit revocation point for outstanding reset links, whose
    /// signatures cover the previous `last_login` value.
    ///
    /// # Returns
    /// The updated `User`, or `None` if no matching user exists
    pub async fn touch_last_login(&self, id: &str) -> Result<Option<User>> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login = ?, updated_at = ? \
             WHERE id = ? AND is_deleted = 0 RETURNING {USER_COLUMNS}"
        ))
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Marks the user's email as verified.
    ///
    /// # Returns
    /// The updated `User`, or `None` if no matching user exists
    pub async fn set_verified_email(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET verified_email = 1, updated_at = ? \
             WHERE id = ? AND is_deleted = 0 RETURNING {USER_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces the user's password hash.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
