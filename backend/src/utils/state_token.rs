//! One-shot tokens bound to a user's stored state.
//!
//! Emailed verification and password-reset links carry a token derived from
//! the user's current database state (password hash, verified flag, last
//! login). Changing any of those inputs invalidates every previously issued
//! token without the token itself ever being persisted.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::database::models::User;

type HmacSha256 = Hmac<Sha256>;

/// Encodes a user id for inclusion in emailed links.
pub fn encode_uid(user_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(user_id.as_bytes())
}

/// Decodes the uid component of an emailed link.
pub fn decode_uid(uid: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(uid.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Salt for tokens that confirm ownership of an email address.
pub const EMAIL_VERIFICATION_SALT: &str = "email-verification";
/// Salt for tokens that authorize a password reset.
pub const PASSWORD_RESET_SALT: &str = "password-reset";

/// Generates and checks HMAC-SHA256 tokens of the form
/// `"{issued_at_hex}-{mac_hex}"`.
pub struct StateTokenGenerator {
    secret: String,
    salt: &'static str,
    max_age_seconds: i64,
}

impl StateTokenGenerator {
    pub fn new(secret: impl Into<String>, salt: &'static str, max_age_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            salt,
            max_age_seconds,
        }
    }

    /// Issues a token for the user's current state.
    pub fn make_token(&self, user: &User) -> String {
        self.token_for_timestamp(user, Utc::now().timestamp())
    }

    /// Checks a token against the user's current state and the max-age
    /// window. Comparison over the full token is constant-time.
    pub fn check_token(&self, user: &User, token: &str) -> bool {
        let Some((timestamp_part, _)) = token.split_once('-') else {
            return false;
        };
        let Ok(timestamp) = i64::from_str_radix(timestamp_part, 16) else {
            return false;
        };

        let age = Utc::now().timestamp() - timestamp;
        if age < 0 || age > self.max_age_seconds {
            return false;
        }

        let expected = self.token_for_timestamp(user, timestamp);
        constant_time_eq(token.as_bytes(), expected.as_bytes())
    }

    fn token_for_timestamp(&self, user: &User, timestamp: i64) -> String {
        format!("{:x}-{}", timestamp, self.signature(user, timestamp))
    }

    fn signature(&self, user: &User, timestamp: i64) -> String {
        // Any change to the hashed state revokes outstanding tokens.
        let login_timestamp = user
            .last_login
            .map(|at| at.timestamp().to_string())
            .unwrap_or_default();
        let state = format!(
            "{}:{}:{}:{}:{}:{}:{}",
            self.salt,
            user.id,
            user.email,
            user.password_hash,
            user.verified_email,
            login_timestamp,
            timestamp
        );

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(state.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn generator(salt: &'static str) -> StateTokenGenerator {
        StateTokenGenerator::new("test-secret-key", salt, 259200)
    }

    fn test_user() -> User {
        User {
            id: "0190d1a2-0000-7000-8000-000000000001".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            is_active: true,
            verified_email: false,
            is_admin: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = generator(PASSWORD_RESET_SALT);
        let user = test_user();

        let token = tokens.make_token(&user);
        assert!(tokens.check_token(&user, &token));
    }

    #[test]
    fn test_last_login_bump_invalidates_token() {
        let tokens = generator(PASSWORD_RESET_SALT);
        let mut user = test_user();

        let token = tokens.make_token(&user);
        user.last_login = Some(Utc::now() + Duration::seconds(5));

        assert!(!tokens.check_token(&user, &token));
    }

    #[test]
    fn test_password_change_invalidates_token() {
        let tokens = generator(PASSWORD_RESET_SALT);
        let mut user = test_user();

        let token = tokens.make_token(&user);
        user.password_hash = "$2b$12$vutsrqponmlkjihgfedcba".to_string();

        assert!(!tokens.check_token(&user, &token));
    }

    #[test]
    fn test_verified_flip_invalidates_token() {
        let tokens = generator(EMAIL_VERIFICATION_SALT);
        let mut user = test_user();

        let token = tokens.make_token(&user);
        user.verified_email = true;

        assert!(!tokens.check_token(&user, &token));
    }

    #[test]
    fn test_salts_do_not_cross() {
        let user = test_user();
        let reset_token = generator(PASSWORD_RESET_SALT).make_token(&user);

        assert!(!generator(EMAIL_VERIFICATION_SALT).check_token(&user, &reset_token));
    }

    #[test]
    fn test_wrong_user_rejected() {
        let tokens = generator(PASSWORD_RESET_SALT);
        let user = test_user();
        let mut other = test_user();
        other.id = "0190d1a2-0000-7000-8000-000000000002".to_string();

        let token = tokens.make_token(&user);
        assert!(!tokens.check_token(&other, &token));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = StateTokenGenerator::new("test-secret-key", PASSWORD_RESET_SALT, 60);
        let user = test_user();

        let stale = tokens.token_for_timestamp(&user, Utc::now().timestamp() - 3600);
        assert!(!tokens.check_token(&user, &stale));
    }

    #[test]
    fn test_uid_round_trip() {
        let id = "0190d1a2-0000-7000-8000-000000000001";
        assert_eq!(decode_uid(&encode_uid(id)).as_deref(), Some(id));
        assert!(decode_uid("not base64 at all!").is_none());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let tokens = generator(PASSWORD_RESET_SALT);
        let user = test_user();

        assert!(!tokens.check_token(&user, ""));
        assert!(!tokens.check_token(&user, "no-dash-but-not-hex"));
        assert!(!tokens.check_token(&user, "zzzz-abcdef"));
    }
}
