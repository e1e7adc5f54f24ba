//! Defines the HTTP routes for email verification.

use super::handlers::{resend_verification, validate_email};
use crate::auth::middleware::{jwt_auth, require_admin};
use axum::{Router, middleware, routing::post};

pub fn email_router() -> Router {
    Router::new()
        .route(
            "/email/resend",
            post(resend_verification)
                .layer(middleware::from_fn(require_admin))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route("/email/validate", post(validate_email))
}
