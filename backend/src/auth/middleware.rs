//! Middleware for protecting authenticated routes and handling authorization.
//!
//! This module contains logic for validating authentication tokens and
//! enforcing capability checks across the API endpoints.

use crate::api::common::ApiError;
use crate::config::Config;
use crate::errors::ServiceError;
use crate::utils::jwt::{Claims, JwtUtils, TokenPurpose};
use axum::{
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

/// JWT authentication middleware
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let config = request
        .extensions()
        .get::<Config>()
        .cloned()
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "internal_error",
            )
        })?;

    // Extract the bearer token from the Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(ApiError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::not_authenticated)?;

    let jwt_utils = JwtUtils::new(&config);
    let claims = jwt_utils.verify(token, TokenPurpose::Access)?;

    // Add claims to request extensions for use in handlers
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Capability check over the authenticated principal's claims.
///
/// Must run after `jwt_auth` so the claims are present.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(ApiError::not_authenticated)?;

    if !claims.is_admin() {
        return Err(ServiceError::permission_denied("Admin capability required").into());
    }

    Ok(next.run(request).await)
}
