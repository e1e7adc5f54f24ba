//! User business logic service.
//!
//! Handles registration, credential checks, and password maintenance.

use crate::database::models::{Profile, RegisterRequest, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::profile_repository::PROFILE_COLUMNS;
use crate::repositories::user_repository::{USER_COLUMNS, UserRepository};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user and their profile with full validation.
    ///
    /// # Arguments
    /// * `register` - Registration data transfer object
    ///
    /// # Returns
    /// The newly created User and Profile
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - Password policy violations
    /// - Duplicate emails
    pub async fn register(&self, register: RegisterRequest) -> ServiceResult<(User, Profile)> {
        if let Err(validation_errors) = register.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        validate_password_strength(&register.password)?;

        let repo = UserRepository::new(self.pool);
        if repo.email_exists(&register.email).await? {
            return Err(ServiceError::validation(
                "email: A user with this email already exists",
            ));
        }

        let password_hash = Self::hash_password(&register.password)?;
        let now = Utc::now();

        // User and profile land together or not at all.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database { source: e.into() })?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash, is_active, verified_email, is_admin, \
             created_at, updated_at, is_deleted) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::now_v7().to_string())
        .bind(&register.email)
        .bind(&password_hash)
        .bind(true)
        .bind(false)
        .bind(false)
        .bind(now)
        .bind(now)
        .bind(false)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let error_msg = e.to_string();
            if error_msg.contains("UNIQUE constraint failed: users.email") {
                ServiceError::validation("email: A user with this email already exists")
            } else {
                ServiceError::Database { source: e.into() }
            }
        })?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (id, user_id, first_name, last_name, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(Uuid::now_v7().to_string())
        .bind(&user.id)
        .bind(&register.first_name)
        .bind(&register.last_name)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database { source: e.into() })?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database { source: e.into() })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok((user, profile))
    }

    /// Checks an email/password pair against the stored credentials.
    ///
    /// # Returns
    /// The matching User
    ///
    /// # Errors
    /// Returns a validation error for unknown emails and wrong passwords
    /// alike, so callers cannot probe which addresses are registered.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let Some(user) = repo.get_user_by_email(email).await? else {
            return Err(ServiceError::validation("Invalid email or password"));
        };

        if !Self::verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login with invalid password");
            return Err(ServiceError::validation("Invalid email or password"));
        }

        Ok(user)
    }

    /// Stores a new password for the user and stamps last login, which
    /// revokes any outstanding reset links.
    pub async fn set_password(&self, user_id: &str, password: &str) -> ServiceResult<()> {
        validate_password_strength(password)?;

        let password_hash = Self::hash_password(password)?;
        let repo = UserRepository::new(self.pool);
        repo.update_password(user_id, &password_hash).await?;
        repo.touch_last_login(user_id).await?;

        Ok(())
    }

    /// Function to hash a password before storing in database
    fn hash_password(password: &str) -> ServiceResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| ServiceError::validation(format!("Password hashing failed: {}", e)))
    }

    /// Function to verify a password against the stored hash
    fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
        verify(password, hash)
            .map_err(|e| ServiceError::validation(format!("Password verification failed: {}", e)))
    }
}

/// Policy checks beyond simple length, shared by registration and reset.
pub(crate) fn validate_password_strength(password: &str) -> ServiceResult<()> {
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServiceError::validation(
            "password: This password is entirely numeric",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct-horse-battery".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_profile() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        let (user, profile) = service
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert!(user.is_active);
        assert!(!user.verified_email);
        assert!(user.last_login.is_none());
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.full_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_creates_no_record() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        service
            .register(register_request("ada@example.com"))
            .await
            .unwrap();
        let err = service
            .register(register_request("ada@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation { .. }));

        let count = UserRepository::new(&pool).count_users().await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_numeric_password() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        let mut request = register_request("ada@example.com");
        request.password = "123456789".to_string();

        let err = service.register(request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_checks_credentials() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        service
            .register(register_request("ada@example.com"))
            .await
            .unwrap();

        let user = service
            .authenticate("ada@example.com", "correct-horse-battery")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        assert!(
            service
                .authenticate("ada@example.com", "wrong-password")
                .await
                .is_err()
        );
        assert!(
            service
                .authenticate("nobody@example.com", "correct-horse-battery")
                .await
                .is_err()
        );
    }
}
