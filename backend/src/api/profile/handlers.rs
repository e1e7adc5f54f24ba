//! Handler functions for profile API endpoints.
//!
//! The profile is always resolved from the authenticated principal; the
//! path id is accepted for URL-shape compatibility but never trusted for
//! the lookup, so a caller can only ever see or edit their own record.

use crate::api::common::ApiError;
use crate::database::models::{ProfileInfo, UpdateProfile};
use crate::errors::ServiceError;
use crate::repositories::profile_repository::ProfileRepository;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json, Path},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;
use validator::Validate;

/// Retrieves the caller's own profile
#[axum::debug_handler]
pub async fn get_profile(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(_id): Path<String>,
) -> Result<ResponseJson<ProfileInfo>, ApiError> {
    let repo = ProfileRepository::new(&pool);
    let profile = repo
        .get_profile_by_user_id(claims.user_id())
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::not_found("Profile", claims.user_id()))?;

    Ok(ResponseJson(ProfileInfo::from(profile)))
}

/// Partially updates the caller's own profile
#[axum::debug_handler]
pub async fn update_profile(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(_id): Path<String>,
    Json(payload): Json<UpdateProfile>,
) -> Result<ResponseJson<ProfileInfo>, ApiError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(ServiceError::from_validation(validation_errors).into());
    }

    let repo = ProfileRepository::new(&pool);
    let profile = repo
        .update_profile(claims.user_id(), &payload)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::not_found("Profile", claims.user_id()))?;

    tracing::info!(user_id = %claims.user_id(), "profile updated");
    Ok(ResponseJson(ProfileInfo::from(profile)))
}
