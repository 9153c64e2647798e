use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Total number of connection attempts made before startup gives up.
    pub connect_retries: u32,
    pub connect_retry_delay: Duration,
    /// Single allowed CORS origin. Permissive CORS when unset.
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                var("POSTGRES_USER", "postgres"),
                var("POSTGRES_PASSWORD", "postgres"),
                var("POSTGRES_HOST", "localhost"),
                var("POSTGRES_PORT", "5432"),
                var("POSTGRES_DB", "inventorydb"),
            ),
        };

        Ok(Self {
            database_url,
            host: var("HOST", "127.0.0.1"),
            port: var("PORT", "8000")
                .parse()
                .context("PORT must be a valid number")?,
            max_connections: var("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            connect_retries: var("DB_CONNECT_RETRIES", "5")
                .parse()
                .context("DB_CONNECT_RETRIES must be a valid number")?,
            connect_retry_delay: Duration::from_secs(
                var("DB_CONNECT_RETRY_DELAY_SECS", "5")
                    .parse()
                    .context("DB_CONNECT_RETRY_DELAY_SECS must be a valid number")?,
            ),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|o| !o.trim().is_empty()),
        })
    }
}
