//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for user authentication
//! (login, registration, token refresh and verification), parse request
//! data, and interact with the `auth::service` for core business logic.

use crate::api::common::ApiError;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::models::RegisterRequest;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<LoginResponse>, ApiError> {
    let auth_service = AuthService::new(&pool, &config);
    let response = auth_service.login(payload).await?;
    Ok(ResponseJson(response))
}

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<UserInfo>), ApiError> {
    let auth_service = AuthService::new(&pool, &config);
    let user = auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(user)))
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<RefreshTokenResponse>, ApiError> {
    let auth_service = AuthService::new(&pool, &config);
    let response = auth_service.refresh_token(payload).await?;
    Ok(ResponseJson(response))
}

/// Handle access token verification request
#[axum::debug_handler]
pub async fn verify_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<ResponseJson<UserInfo>, ApiError> {
    let auth_service = AuthService::new(&pool, &config);
    let user = auth_service.verify_token(payload).await?;
    Ok(ResponseJson(user))
}
