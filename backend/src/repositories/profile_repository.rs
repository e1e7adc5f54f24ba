//! Database repository for profile records.

use crate::database::models::{Profile, UpdateProfile};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

pub(crate) const PROFILE_COLUMNS: &str = "id, user_id, first_name, last_name, created_at, updated_at";

/// Repository for profile database operations.
///
/// Each profile is one-to-one with a user; lookups key on the user id.
pub struct ProfileRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    /// Creates a new ProfileRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Retrieves the profile belonging to a user.
    pub async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    /// Applies a partial update; `None` fields keep their stored value.
    ///
    /// # Returns
    /// The updated `Profile`, or `None` if the user has no profile
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &UpdateProfile,
    ) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET \
             first_name = COALESCE(?, first_name), \
             last_name = COALESCE(?, last_name), \
             updated_at = ? \
             WHERE user_id = ? RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }
}
