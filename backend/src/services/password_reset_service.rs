//! Password reset business logic.
//!
//! The forget step deliberately swallows lookup failures so the endpoint
//! never reveals whether an email address is registered. Reset confirmation
//! bumps last login, which revokes the whole outstanding token family.

use crate::config::Config;
use crate::database::models::{ForgetPasswordRequest, ResetPasswordRequest, ResetTokenRequest, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::profile_repository::ProfileRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::EmailService;
use crate::services::user_service::UserService;
use crate::utils::state_token::{PASSWORD_RESET_SALT, StateTokenGenerator, decode_uid, encode_uid};
use sqlx::SqlitePool;
use validator::Validate;

pub struct PasswordResetService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    /// Email service for sending reset emails
    email_service: Option<EmailService>,
    tokens: StateTokenGenerator,
    reset_url: String,
}

impl<'a> PasswordResetService<'a> {
    /// Creates a new PasswordResetService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `config` - Application configuration
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        let email_service = match config.email_config() {
            Some(email_config) => match EmailService::new(email_config) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize email service: {}. Email notifications will be disabled.",
                        e
                    );
                    None
                }
            },
            None => None,
        };

        Self {
            pool,
            email_service,
            tokens: StateTokenGenerator::new(
                config.secret_key.clone(),
                PASSWORD_RESET_SALT,
                config.token_max_age_seconds,
            ),
            reset_url: config.client_reset_url.clone(),
        }
    }

    /// Issues a reset token for the user's current state.
    pub fn make_token(&self, user: &User) -> String {
        self.tokens.make_token(user)
    }

    /// Starts the reset flow for an email address.
    ///
    /// Always succeeds once the payload passes schema validation; whether a
    /// matching user exists is never observable from the response.
    pub async fn forget(&self, request: ForgetPasswordRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let repo = UserRepository::new(self.pool);
        match repo.get_user_by_email(&request.email).await {
            Ok(Some(user)) if user.is_active => self.send_reset_email(&user).await,
            Ok(_) => {
                tracing::debug!("password reset requested for unknown or inactive account");
            }
            Err(e) => {
                tracing::warn!("password reset lookup failed: {}", e);
            }
        }

        Ok(())
    }

    /// Checks that an emailed reset link is still usable.
    pub async fn validate_token(&self, request: ResetTokenRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        self.checked_user(&request.uid, &request.token).await?;
        Ok(())
    }

    /// Consumes a reset token and stores the new password.
    pub async fn reset(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let user = self.checked_user(&request.uid, &request.token).await?;

        // Persisting the hash and stamping last_login both change the token
        // signing input, so this link and its siblings die here.
        let user_service = UserService::new(self.pool);
        user_service.set_password(&user.id, &request.password).await?;

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(())
    }

    async fn checked_user(&self, uid: &str, token: &str) -> ServiceResult<User> {
        let user_id = decode_uid(uid).ok_or(ServiceError::InvalidToken)?;

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(&user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(ServiceError::InvalidToken)?;

        if !self.tokens.check_token(&user, token) {
            return Err(ServiceError::InvalidToken);
        }

        Ok(user)
    }

    async fn send_reset_email(&self, user: &User) {
        let Some(ref email_service) = self.email_service else {
            tracing::warn!(
                "Email service not configured. Password reset email not sent to {}",
                user.email
            );
            return;
        };

        let url = format!(
            "{}?uid={}&token={}",
            self.reset_url,
            encode_uid(&user.id),
            self.tokens.make_token(user)
        );

        let profile = ProfileRepository::new(self.pool)
            .get_profile_by_user_id(&user.id)
            .await
            .ok()
            .flatten();
        let recipient_name = match profile.map(|p| p.full_name()) {
            Some(name) if !name.is_empty() => name,
            _ => "there".to_string(),
        };

        match email_service
            .send_password_reset_email(&user.email, &recipient_name, &url)
            .await
        {
            Ok(_) => {
                tracing::info!("Password reset email sent successfully to {}", user.email);
            }
            Err(e) => {
                tracing::error!(
                    "Failed to send password reset email to {}: {}",
                    user.email,
                    e
                );
            }
        }
    }
}
