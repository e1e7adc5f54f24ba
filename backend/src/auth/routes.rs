//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle endpoints like user login, registration, and token
//! management. These are designed to be integrated into the main Axum router.

use crate::auth::handlers::*;
use axum::{Router, routing::post};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/token/refresh", post(refresh_token))
        .route("/token/verify", post(verify_token))
}
