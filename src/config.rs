//! Service configuration.
//!
//! Loaded from environment variables (after `.env` has been read by `main`),
//! with development defaults for everything except secrets in production.

use std::env;

use tracing::warn;

const DEFAULT_PORT: &str = "5000";
const DEFAULT_JWT_LIFETIME_SECS: &str = "7200";
const DEV_JWT_SECRET: &str = "marketplace-dev-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,

    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// NATS server for domain events (optional)
    pub nats_url: Option<String>,

    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_lifetime_secs: i64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?;

        let jwt_lifetime_secs: i64 = env::var("JWT_LIFETIME_SECS")
            .unwrap_or_else(|_| DEFAULT_JWT_LIFETIME_SECS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?;
        if jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        let jwt_secret = jwt_secret(env::var("JWT_SECRET").ok())?;

        Ok(Config {
            port,
            database_url: non_empty_var("DATABASE_URL"),
            nats_url: non_empty_var("NATS_URL"),
            jwt_secret,
            jwt_lifetime_secs,
        })
    }
}

/// Unset falls back to the development secret; set but empty is an error.
fn jwt_secret(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(secret) if secret.is_empty() => Err(ConfigError::MissingRequired("JWT_SECRET".to_string())),
        Some(secret) => Ok(secret),
        None => {
            warn!("JWT_SECRET not set, signing tokens with the development secret");
            Ok(DEV_JWT_SECRET.to_string())
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
