//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, token secrets and lifetimes, and the
//! optional SMTP settings used for outbound email.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// Secret for signing access/refresh JWTs.
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub jwt_refresh_expires_in_days: u64,
    /// Secret for the state-bound email verification / password reset tokens.
    pub secret_key: String,
    /// Maximum age of verification and reset tokens.
    pub token_max_age_seconds: i64,
    /// Frontend URLs the emailed links point at.
    pub client_verify_url: String,
    pub client_reset_url: String,
    pub server_port: u16,
    smtp_host: Option<String>,
    smtp_port: u16,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    from_name: String,
    from_email: Option<String>,
}

/// SMTP settings, present only when the environment carries them.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_name: String,
    pub from_email: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let jwt_expires_in_seconds = env::var("JWT_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<u64>()
            .context("JWT_EXPIRES_IN_SECONDS must be a valid number")?;

        let jwt_refresh_expires_in_days = env::var("JWT_REFRESH_EXPIRES_IN_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("JWT_REFRESH_EXPIRES_IN_DAYS must be a valid number")?;

        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY not set")?;

        let token_max_age_seconds = env::var("TOKEN_MAX_AGE_SECONDS")
            .unwrap_or_else(|_| "259200".to_string())
            .parse::<i64>()
            .context("TOKEN_MAX_AGE_SECONDS must be a valid number")?;

        let client_verify_url = env::var("CLIENT_VERIFY_URL")
            .unwrap_or_else(|_| "http://localhost:3000/verify-email".to_string());

        let client_reset_url = env::var("CLIENT_RESET_URL")
            .unwrap_or_else(|_| "http://localhost:3000/reset-password".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_expires_in_seconds,
            jwt_refresh_expires_in_days,
            secret_key,
            token_max_age_seconds,
            client_verify_url,
            client_reset_url,
            server_port,
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Accounts".to_string()),
            from_email: env::var("FROM_EMAIL").ok(),
        })
    }

    /// SMTP settings when fully configured, `None` otherwise.
    pub fn email_config(&self) -> Option<EmailConfig> {
        Some(EmailConfig {
            smtp_host: self.smtp_host.clone()?,
            smtp_port: self.smtp_port,
            smtp_username: self.smtp_username.clone()?,
            smtp_password: self.smtp_password.clone()?,
            from_name: self.from_name.clone(),
            from_email: self.from_email.clone()?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// In-memory configuration for service and utility tests.
    pub(crate) fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: "test-jwt-secret".to_string(),
            jwt_expires_in_seconds: 900,
            jwt_refresh_expires_in_days: 30,
            secret_key: "test-secret-key".to_string(),
            token_max_age_seconds: 259200,
            client_verify_url: "http://localhost:3000/verify-email".to_string(),
            client_reset_url: "http://localhost:3000/reset-password".to_string(),
            server_port: 3000,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_name: "Accounts".to_string(),
            from_email: None,
        }
    }
}
