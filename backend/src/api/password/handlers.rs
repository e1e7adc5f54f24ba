//! Handler functions for the password reset API endpoints.
//!
//! The forget endpoint answers identically whether or not the email is
//! registered; only schema failures surface to the caller.

use crate::api::common::ApiError;
use crate::config::Config;
use crate::database::models::{ForgetPasswordRequest, ResetPasswordRequest, ResetTokenRequest};
use crate::services::password_reset_service::PasswordResetService;
use axum::{
    extract::{Extension, Json},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Starts the reset flow; always answers with the generic message
#[axum::debug_handler]
pub async fn forget_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ForgetPasswordRequest>,
) -> Result<ResponseJson<serde_json::Value>, ApiError> {
    let service = PasswordResetService::new(&pool, &config);
    service.forget(payload).await?;

    Ok(ResponseJson(serde_json::json!({
        "detail": "Password reset email sent if the email exists"
    })))
}

/// Checks an emailed reset link before the new password is typed
#[axum::debug_handler]
pub async fn validate_reset_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResetTokenRequest>,
) -> Result<ResponseJson<serde_json::Value>, ApiError> {
    let service = PasswordResetService::new(&pool, &config);
    service.validate_token(payload).await?;

    Ok(ResponseJson(serde_json::json!({
        "message": "Token is valid"
    })))
}

/// Consumes a reset token and stores the new password
#[axum::debug_handler]
pub async fn reset_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<serde_json::Value>, ApiError> {
    let service = PasswordResetService::new(&pool, &config);
    service.reset(payload).await?;

    Ok(ResponseJson(serde_json::json!({
        "detail": "Password reset successful."
    })))
}
