//! JWT token utilities for authentication and authorization.
//!
//! Provides secure token creation, validation, and claims management for
//! user authentication. Access and refresh tokens share one claims shape
//! and are told apart by an explicit purpose tag.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::models::User;
use crate::errors::ServiceError;

/// What a token is good for. A refresh token presented where an access
/// token is expected (or vice versa) fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

/// JWT claims structure containing user authentication data
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token purpose tag
    pub purpose: TokenPurpose,
    /// Whether the user holds the admin capability
    pub admin: bool,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance with keys from the configuration
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            access_ttl: Duration::seconds(config.jwt_expires_in_seconds as i64),
            refresh_ttl: Duration::days(config.jwt_refresh_expires_in_days as i64),
        }
    }

    /// Generate a short-lived access token for the user
    pub fn sign_access(&self, user: &User) -> Result<String, ServiceError> {
        self.sign(user, TokenPurpose::Access, self.access_ttl)
    }

    /// Generate a long-lived refresh token for the user
    pub fn sign_refresh(&self, user: &User) -> Result<String, ServiceError> {
        self.sign(user, TokenPurpose::Refresh, self.refresh_ttl)
    }

    fn sign(
        &self,
        user: &User,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: user.id.clone(),
            purpose,
            admin: user.is_admin,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::validation(format!("Token generation failed: {}", e)))
    }

    /// Validate a token and check it carries the expected purpose.
    ///
    /// Pure function over the token bytes and the shared secret; every
    /// failure mode collapses into `ServiceError::InvalidToken` so callers
    /// never leak why a token was rejected.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, ServiceError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|_| ServiceError::InvalidToken)?;

        if claims.purpose != purpose {
            return Err(ServiceError::InvalidToken);
        }

        Ok(claims)
    }

    pub fn access_expires_in(&self) -> u64 {
        self.access_ttl.num_seconds() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: "0190d1a2-0000-7000-8000-000000000001".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            is_active: true,
            verified_email: true,
            is_admin: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let utils = JwtUtils::new(&Config::for_tests());
        let user = test_user();

        let token = utils.sign_access(&user).unwrap();
        let claims = utils.verify(&token, TokenPurpose::Access).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.purpose, TokenPurpose::Access);
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let utils = JwtUtils::new(&Config::for_tests());
        let token = utils.sign_refresh(&test_user()).unwrap();

        assert!(matches!(
            utils.verify(&token, TokenPurpose::Access),
            Err(ServiceError::InvalidToken)
        ));
        assert!(utils.verify(&token, TokenPurpose::Refresh).is_ok());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let utils = JwtUtils::new(&Config::for_tests());
        let mut token = utils.sign_access(&test_user()).unwrap();
        token.push('x');

        assert!(matches!(
            utils.verify(&token, TokenPurpose::Access),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let mut other_config = Config::for_tests();
        other_config.jwt_secret = "some-other-secret".to_string();

        let token = JwtUtils::new(&other_config)
            .sign_access(&test_user())
            .unwrap();
        let utils = JwtUtils::new(&Config::for_tests());

        assert!(matches!(
            utils.verify(&token, TokenPurpose::Access),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let utils = JwtUtils::new(&Config::for_tests());
        let user = test_user();

        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            purpose: TokenPurpose::Access,
            admin: false,
            exp: (now - Duration::hours(2)).timestamp() as usize,
            iat: (now - Duration::hours(3)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &utils.encoding_key).unwrap();

        assert!(matches!(
            utils.verify(&token, TokenPurpose::Access),
            Err(ServiceError::InvalidToken)
        ));
    }
}
