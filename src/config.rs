use log::LevelFilter;
use sqlx::PgPool;
use std::env;
use std::path::PathBuf;

use crate::errors::StartupError;

/// Prefix shared by every environment variable the server reads.
pub const ENV_PREFIX: &str = "DTB_";

#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub log_level: LevelFilter,
    pub bind_address: String,
    pub schema_path: PathBuf,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub name: Option<String>,
}

/// State shared by every request: built once in `main` and handed to the
/// server through `web::Data`.
pub struct AppData {
    pub config: Config,
    pub db: PgPool,
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Builds the configuration from a lookup over unprefixed keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match get("DB_PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| StartupError::Config(format!("{}DB_PORT is not a port: {}", ENV_PREFIX, v)))?,
            None => 5432,
        };
        let workers = match get("WORKERS") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(StartupError::Config(format!(
                        "{}WORKERS must be a positive integer: {}",
                        ENV_PREFIX, v
                    )))
                }
            },
            None => num_cpus::get(),
        };

        Ok(Config {
            db: DbConfig {
                host: get("DB_HOST").unwrap_or_default(),
                port,
                user: get("DB_USER").unwrap_or_default(),
                pass: get("DB_PASS").unwrap_or_default(),
                name: get("DB_NAME"),
            },
            log_level: parse_log_level(get("LOG_LEVEL").as_deref().unwrap_or("")),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            schema_path: get("SCHEMA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/app/schema.sql")),
            workers,
        })
    }
}

pub fn parse_log_level(value: &str) -> LevelFilter {
    match value.to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" => LevelFilter::Warn,
        "ERROR" | "FATAL" | "PANIC" => LevelFilter::Error,
        _ => LevelFilter::Warn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, StartupError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db.port, 5432);
        assert_eq!(config.db.host, "");
        assert!(config.db.name.is_none());
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.schema_path, PathBuf::from("/app/schema.sql"));
        assert!(config.workers > 0);
    }

    #[test]
    fn reads_database_settings() {
        let config = config(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "trainer"),
            ("DB_PASS", "secret"),
            ("DB_NAME", "trainer"),
            ("LOG_LEVEL", "debug"),
            ("WORKERS", "2"),
        ])
        .unwrap();
        assert_eq!(config.db.host, "db.internal");
        assert_eq!(config.db.port, 6543);
        assert_eq!(config.db.user, "trainer");
        assert_eq!(config.db.pass, "secret");
        assert_eq!(config.db.name.as_deref(), Some("trainer"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(config(&[("DB_PORT", "not-a-port")]).is_err());
        assert!(config(&[("WORKERS", "0")]).is_err());
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_log_level("info"), LevelFilter::Info);
        assert_eq!(parse_log_level("FATAL"), LevelFilter::Error);
        assert_eq!(parse_log_level("PANIC"), LevelFilter::Error);
        assert_eq!(parse_log_level("verbose"), LevelFilter::Warn);
    }
}
