//! Defines the HTTP routes for profile retrieval and update.

use super::handlers::{get_profile, update_profile};
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn profile_router() -> Router {
    Router::new().route(
        "/profile/{id}",
        get(get_profile)
            .patch(update_profile)
            .layer(middleware::from_fn(jwt_auth)),
    )
}
