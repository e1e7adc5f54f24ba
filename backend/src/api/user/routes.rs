//! Defines the HTTP routes for user listing.

use super::handlers::list_users;
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn user_router() -> Router {
    Router::new().route(
        "/users",
        get(list_users).layer(middleware::from_fn(jwt_auth)),
    )
}
