//! Defines the HTTP routes for password reset.

use super::handlers::{forget_password, reset_password, validate_reset_token};
use axum::{Router, routing::post};

pub fn password_router() -> Router {
    Router::new()
        .route("/password/forget", post(forget_password))
        .route("/password/validate-token", post(validate_reset_token))
        .route("/password/reset", post(reset_password))
}
