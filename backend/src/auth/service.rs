//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::RegisterRequest;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::UserService;
use crate::services::verification_service::VerificationService;
use crate::utils::jwt::{JwtUtils, TokenPurpose};
use sqlx::SqlitePool;
use validator::Validate;

/// Authentication service for handling login, registration, and token management
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: JwtUtils,
    user_service: UserService<'a>,
    verification: VerificationService<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        AuthService {
            pool,
            jwt_utils: JwtUtils::new(config),
            user_service: UserService::new(pool),
            verification: VerificationService::new(pool, config),
        }
    }

    /// Authenticate user credentials and generate a JWT token pair.
    ///
    /// An unverified user is refused but gets a fresh verification email; an
    /// inactive user is refused outright. A successful login stamps
    /// `last_login`, which also revokes outstanding password-reset links.
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        if let Err(validation_errors) = login_request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let user = self
            .user_service
            .authenticate(&login_request.email, &login_request.password)
            .await?;

        if !user.is_active {
            return Err(ServiceError::AccountNotActive);
        }

        if !user.verified_email {
            self.verification.send_verification(&user).await;
            return Err(ServiceError::EmailNotVerified);
        }

        let access_token = self.jwt_utils.sign_access(&user)?;
        let refresh_token = self.jwt_utils.sign_refresh(&user)?;

        // The response carries the freshly stamped last_login.
        let user = UserRepository::new(self.pool)
            .touch_last_login(&user.id)
            .await?
            .unwrap_or(user);

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            access_token,
            refresh_token,
            user: UserInfo::from(&user),
            expires_in: self.jwt_utils.access_expires_in(),
        })
    }

    /// Register a new user and dispatch the verification email.
    pub async fn register(&self, register_request: RegisterRequest) -> ServiceResult<UserInfo> {
        let (user, _profile) = self.user_service.register(register_request).await?;

        self.verification.send_verification(&user).await;

        Ok(UserInfo::from(&user))
    }

    /// Mint a fresh access token from a refresh token.
    pub async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> ServiceResult<RefreshTokenResponse> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let claims = self
            .jwt_utils
            .verify(&request.refresh_token, TokenPurpose::Refresh)?;

        // The subject must still exist and be usable.
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if !user.is_active {
            return Err(ServiceError::AccountNotActive);
        }

        let access_token = self.jwt_utils.sign_access(&user)?;
        repo.touch_last_login(&user.id).await?;

        Ok(RefreshTokenResponse {
            access_token,
            expires_in: self.jwt_utils.access_expires_in(),
        })
    }

    /// Validate an access token and return the user it belongs to.
    pub async fn verify_token(&self, request: VerifyTokenRequest) -> ServiceResult<UserInfo> {
        if let Err(validation_errors) = request.validate() {
            return Err(ServiceError::from_validation(validation_errors));
        }

        let claims = self.jwt_utils.verify(&request.token, TokenPurpose::Access)?;

        let user = UserRepository::new(self.pool)
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        Ok(UserInfo::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::User;
    use crate::database::test_pool;

    async fn registered_user(pool: &SqlitePool, verified: bool) -> User {
        let (user, _) = UserService::new(pool)
            .register(RegisterRequest {
                email: "ada@example.com".to_string(),
                password: "correct-horse-battery".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await
            .unwrap();

        if verified {
            UserRepository::new(pool)
                .set_verified_email(&user.id)
                .await
                .unwrap()
                .unwrap()
        } else {
            user
        }
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "ada@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_returns_token_pair_and_stamps_last_login() {
        let pool = test_pool().await;
        let config = Config::for_tests();
        let service = AuthService::new(&pool, &config);
        let user = registered_user(&pool, true).await;

        let response = service.login(login_request()).await.unwrap();
        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_eq!(response.user.id, user.id);
        assert!(response.user.last_login.is_some());
        assert_eq!(response.expires_in, config.jwt_expires_in_seconds);

        let stored = UserRepository::new(&pool)
            .get_user_by_id(&user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_unverified_user_is_refused() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        registered_user(&pool, false).await;

        assert!(matches!(
            service.login(login_request()).await,
            Err(ServiceError::EmailNotVerified)
        ));
    }

    #[tokio::test]
    async fn test_login_inactive_user_is_refused() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool, true).await;

        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(&user.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            service.login(login_request()).await,
            Err(ServiceError::AccountNotActive)
        ));
    }

    #[tokio::test]
    async fn test_login_bad_credentials_are_a_validation_error() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        registered_user(&pool, true).await;

        let err = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_verify_token_returns_matching_user() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool, true).await;

        let response = service.login(login_request()).await.unwrap();
        let info = service
            .verify_token(VerifyTokenRequest {
                token: response.access_token,
            })
            .await
            .unwrap();
        assert_eq!(info.id, user.id);
    }

    #[tokio::test]
    async fn test_verify_rejects_refresh_token() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        registered_user(&pool, true).await;

        let response = service.login(login_request()).await.unwrap();
        assert!(matches!(
            service
                .verify_token(VerifyTokenRequest {
                    token: response.refresh_token,
                })
                .await,
            Err(ServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_refresh_mints_new_access_token() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        let user = registered_user(&pool, true).await;

        let login = service.login(login_request()).await.unwrap();
        let refreshed = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token,
            })
            .await
            .unwrap();

        let info = service
            .verify_token(VerifyTokenRequest {
                token: refreshed.access_token,
            })
            .await
            .unwrap();
        assert_eq!(info.id, user.id);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let pool = test_pool().await;
        let service = AuthService::new(&pool, &Config::for_tests());
        registered_user(&pool, true).await;

        let login = service.login(login_request()).await.unwrap();
        assert!(matches!(
            service
                .refresh_token(RefreshTokenRequest {
                    refresh_token: login.access_token,
                })
                .await,
            Err(ServiceError::InvalidToken)
        ));
    }
}
