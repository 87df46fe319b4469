use log::{debug, warn};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Executor, PgPool};
use std::path::Path;
use std::time::Duration;

use crate::config::DbConfig;
use crate::errors::StartupError;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const CONNECT_BACKOFF: Duration = Duration::from_secs(5);

pub fn connect_options(config: &DbConfig) -> PgConnectOptions {
    // Unset values fall back to the libpq environment defaults.
    let mut options = PgConnectOptions::new().port(config.port);
    if !config.host.is_empty() {
        options = options.host(&config.host);
    }
    if !config.user.is_empty() {
        options = options.username(&config.user);
    }
    if !config.pass.is_empty() {
        options = options.password(&config.pass);
    }
    if let Some(name) = &config.name {
        options = options.database(name);
    }
    options
}

/// Opens the connection pool, retrying a bounded number of times before giving up.
pub async fn init_database(config: &DbConfig) -> Result<PgPool, StartupError> {
    debug!("initializing database");
    let options = connect_options(config);

    let mut attempts = 0;
    let pool = loop {
        let result = PgPoolOptions::new()
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options.clone())
            .await;
        match result {
            Ok(pool) => break pool,
            Err(err) => {
                attempts += 1;
                if attempts >= CONNECT_ATTEMPTS {
                    return Err(StartupError::Database(err));
                }
                warn!(
                    "database connection attempt {} failed, waiting {}s then retrying: {}",
                    attempts,
                    CONNECT_BACKOFF.as_secs(),
                    err
                );
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
        }
    };

    debug!("database initialized");
    Ok(pool)
}

pub async fn init_schema(db: &PgPool, path: &Path) -> Result<(), StartupError> {
    debug!("initializing database schema from {}", path.display());
    let schema = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| StartupError::Schema(format!("{}: {}", path.display(), err)))?;
    apply_schema(db, &schema).await?;
    debug!("database schema initialized");
    Ok(())
}

/// Runs every statement of a schema file in one round trip.
pub async fn apply_schema(db: &PgPool, schema: &str) -> Result<(), StartupError> {
    db.execute(schema)
        .await
        .map_err(|err| StartupError::Schema(err.to_string()))?;
    Ok(())
}
