//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Invitation and reminder
//! windows live here rather than as literals in the domain.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Secret used to sign and verify session JWTs
    pub jwt_secret: String,

    /// Base URL for the application (used in invitation links)
    pub app_base_url: String,

    /// Shared secret for unsubscribe-token derivation
    pub unsubscribe_secret: String,

    /// Days a fresh or resent invitation stays valid
    pub invitation_expiry_days: i64,

    /// Minimum age (hours) before a pending invitation is swept
    /// by the bulk reminder job
    pub reminder_min_age_hours: i64,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?,

            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "https://app.habitek.ca".to_string()),

            unsubscribe_secret: env::var("UNSUBSCRIBE_SECRET")
                .map_err(|_| anyhow::anyhow!("UNSUBSCRIBE_SECRET is required"))?,

            invitation_expiry_days: env::var("INVITATION_EXPIRY_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),

            reminder_min_age_hours: env::var("REMINDER_MIN_AGE_HOURS")
                .unwrap_or_else(|_| "72".to_string())
                .parse()
                .unwrap_or(72),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "habitek=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }
}
