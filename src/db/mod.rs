use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;

pub mod inventory;
pub mod products;

pub use inventory::*;
pub use products::*;

/// Open the connection pool, retrying a bounded number of times with a fixed delay.
pub async fn connect_with_retry(config: &Config) -> anyhow::Result<PgPool> {
    let pool = retry_with_delay(
        config.connect_retries,
        config.connect_retry_delay,
        |attempt| {
            info!(attempt, max = config.connect_retries, "Connecting to PostgreSQL...");
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
        },
    )
    .await
    .map_err(|e| {
        anyhow::anyhow!(
            "failed to connect to the database after {} attempts: {e}",
            config.connect_retries.max(1)
        )
    })?;

    info!("Database connection pool established.");
    Ok(pool)
}

/// Apply pending schema migrations.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Migrations complete.");
    Ok(())
}

/// Run `op` up to `attempts` times (at least once), sleeping `delay` between failures.
/// `op` receives the 1-based attempt number.
pub async fn retry_with_delay<T, E, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(
                    attempt,
                    error = %e,
                    retry_in_secs = delay.as_secs_f64(),
                    "Database connection attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn count_products(pool: &PgPool) -> AppResult<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
