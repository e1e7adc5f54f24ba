//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub verified_email: bool,
    pub is_admin: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Registration payload validated before any record is created.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 150, message = "First name too long"))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(max = 150, message = "Last name too long"))]
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Display name derived from the stored name parts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Admin-initiated request to re-send a verification email.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResendEmailRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
}

/// Emailed verification link payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailTokenRequest {
    #[validate(length(min = 1, message = "Uid is required"))]
    pub uid: String,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Starts the password-reset flow for an email address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgetPasswordRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
}

/// Pre-flight check of an emailed reset link.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetTokenRequest {
    #[validate(length(min = 1, message = "Uid is required"))]
    pub uid: String,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Completes the password-reset flow.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Uid is required"))]
    pub uid: String,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(max = 150, message = "First name too long"))]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name too long"))]
    pub last_name: Option<String>,
}

/// Profile payload returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl From<Profile> for ProfileInfo {
    fn from(profile: Profile) -> Self {
        let full_name = profile.full_name();
        ProfileInfo {
            id: profile.id,
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            full_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: &str) -> Profile {
        Profile {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name_joins_parts() {
        assert_eq!(profile("Ada", "Lovelace").full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        assert_eq!(profile("Ada", "").full_name(), "Ada");
        assert_eq!(profile("", "").full_name(), "");
    }
}
