//! Handler functions for email verification API endpoints.
//!
//! These functions process requests to re-send a verification email and to
//! consume an emailed verification token.

use crate::api::common::ApiError;
use crate::auth::models::UserInfo;
use crate::config::Config;
use crate::database::models::{EmailTokenRequest, ResendEmailRequest};
use crate::services::verification_service::VerificationService;
use axum::{
    extract::{Extension, Json},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Re-sends the verification email to a specified user (admin only)
#[axum::debug_handler]
pub async fn resend_verification(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResendEmailRequest>,
) -> Result<ResponseJson<serde_json::Value>, ApiError> {
    let service = VerificationService::new(&pool, &config);
    service.resend(payload).await?;

    Ok(ResponseJson(serde_json::json!({
        "message": "Email sent successfully"
    })))
}

/// Consumes an emailed verification token and returns the verified user
#[axum::debug_handler]
pub async fn validate_email(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<EmailTokenRequest>,
) -> Result<ResponseJson<UserInfo>, ApiError> {
    let service = VerificationService::new(&pool, &config);
    let user = service.confirm(payload).await?;

    Ok(ResponseJson(UserInfo::from(&user)))
}
