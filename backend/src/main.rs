//! Main entry point for the accounts backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, and registers all API routes and middleware. It orchestrates
//! the application's startup and defines its overall structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    let pool = db.pool().clone();

    let app = Router::new()
        .route("/", get(root_handler))
        .merge(auth::routes::auth_router())
        .merge(api::email::routes::email_router())
        .merge(api::password::routes::password_router())
        .merge(api::user::routes::user_router())
        .merge(api::profile::routes::profile_router())
        .layer(Extension(pool))
        .layer(Extension(config.clone()));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting accounts server on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Accounts Backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
