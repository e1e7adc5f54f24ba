//! Email verification business logic.
//!
//! Issues state-bound verification tokens, dispatches the emailed links,
//! and consumes tokens to flip the verified flag.

use crate::config::Config;
use crate::database::models::{EmailTokenRequest, ResendEmailRequest, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::profile_repository::ProfileRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::EmailService;
use crate::utils::state_token::{EMAIL_VERIFICATION_SALT, StateTokenGenerator, decode_uid, encode_uid};
use sqlx::SqlitePool;
use validator::Validate;

pub struct VerificationService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    /// Email service for sending verification emails
    email_service: Option<EmailService>,
    tokens: StateTokenGenerator,
    verify_url: String,
}

impl<'a> VerificationService<'a> {
    /// Creates a new VerificationService instance.
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
            None => {
                tracing::warn!(
                    "Email configuration not found. Email notifications will be disabled."
                );
                None
            }
        };

        Self {
            pool,
            email_service,
            tokens: StateTokenGenerator::new(
                config.secret_key.clone(),
                EMAIL_VERIFICATION_SALT,
                config.token_max_age_seconds,
            ),
            verify_url: config.client_verify_url.clone(),
        }
    }

    /// Issues a verification token for the user's current state.
    pub fn make_token(&self, user: &User) -> String {
        self.tokens.make_token(user)
    }

    /// Attempts to send the verification email, logging but never failing
    /// the surrounding request if the email service is unavailable.
    pub async fn send_verification(&self, user: &User) {
        let Some(ref email_service) = self.email_service else {
            tracing::warn!(
                "Email service not configured. Verification email not sent to {}",
                user.email
            );
            return;
        };

        let url = format!(
            "{}?uid={}&token={}",
            self.verify_url,
            encode_uid(&user.id),
            self.tokens.make_token(user)
        );

        let recipient_name = self.recipient_name(user).await;

        match email_service
            .send_verification_email(&user.email, &recipient_name, &url)
            .await
        {
            Ok(_) => {
                tracing::info!("Verification email sent successfully to {}", user.email);
            }
            Err(e) => {
                tracing::error!("Failed to send verification email to {}: {}", user.email, e);
            }
        }
    }

    /// Re-sends the verification email to a specified user.
    ///
    /// # Errors
    /// Returns `ServiceError` for unknown emails and already-verified users
    pub async fn resend(&self, request: ResendEmailRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &request.email))?;

        if user.verified_email {
            return Err(ServiceError::validation("Email is already verified"));
        }

        self.send_verification(&user).await;
        Ok(())
    }

    /// Consumes a verification token and flips the verified flag.
    ///
    /// The flip changes the token's signing input, so a consumed token can
    /// never validate twice.
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidToken` for any malformed, expired, or
    /// state-mismatched token
    pub async fn confirm(&self, request: EmailTokenRequest) -> ServiceResult<User> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let user_id = decode_uid(&request.uid).ok_or(ServiceError::InvalidToken)?;

        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(&user_id)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if !self.tokens.check_token(&user, &request.token) {
            return Err(ServiceError::InvalidToken);
        }

        let user = repo
            .set_verified_email(&user.id)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        tracing::info!(user_id = %user.id, "email verified");
        Ok(user)
    }

    async fn recipient_name(&self, user: &User) -> String {
        let profile = ProfileRepository::new(self.pool)
            .get_profile_by_user_id(&user.id)
            .await
            .ok()
            .flatten();

        match profile.map(|p| p.full_name()) {
            Some(name) if !name.is_empty() => name,
            _ => "there".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::RegisterRequest;
    use crate::database::test_pool;
    use crate::services::user_service::UserService;

    async fn registered_user(pool: &SqlitePool) -> User {
        let (user, _) = UserService::new(pool)
            .register(RegisterRequest {
                email: "ada@example.com".to_string(),
                password: "correct-horse-battery".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await
            .unwrap();
        user
    }

    #[tokio::test]
    async fn test_confirm_flips_verified_flag() {
        let pool = test_pool().await;
        let service = VerificationService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool).await;

        let request = EmailTokenRequest {
            uid: encode_uid(&user.id),
            token: service.make_token(&user),
        };

        let user = service.confirm(request).await.unwrap();
        assert!(user.verified_email);
    }

    #[tokio::test]
    async fn test_consumed_token_cannot_be_replayed() {
        let pool = test_pool().await;
        let service = VerificationService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool).await;

        let request = EmailTokenRequest {
            uid: encode_uid(&user.id),
            token: service.make_token(&user),
        };

        service.confirm(request.clone()).await.unwrap();
        assert!(matches!(
            service.confirm(request).await,
            Err(ServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_confirm_rejects_garbage() {
        let pool = test_pool().await;
        let service = VerificationService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool).await;

        let request = EmailTokenRequest {
            uid: encode_uid(&user.id),
            token: "deadbeef-0000".to_string(),
        };
        assert!(matches!(
            service.confirm(request).await,
            Err(ServiceError::InvalidToken)
        ));

        let request = EmailTokenRequest {
            uid: "!!not-base64!!".to_string(),
            token: service.make_token(&user),
        };
        assert!(matches!(
            service.confirm(request).await,
            Err(ServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_resend_requires_unverified_user() {
        let pool = test_pool().await;
        let service = VerificationService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool).await;

        // Unknown user is a 404, not a silent success.
        let err = service
            .resend(ResendEmailRequest {
                email: "nobody@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        // Unverified user succeeds even with email delivery unconfigured.
        service
            .resend(ResendEmailRequest {
                email: user.email.clone(),
            })
            .await
            .unwrap();

        UserRepository::new(&pool)
            .set_verified_email(&user.id)
            .await
            .unwrap();
        let err = service
            .resend(ResendEmailRequest { email: user.email })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }
}
