//! Server configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheConfig;
use crate::matrix::OrsConfig;
use crate::store::PostgresConfig;

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL (or POSTGRES_URL) must be set unless FIXTURE_PATH is given")]
    MissingDatabaseUrl,

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where timetable data is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Postgres(String),
    Fixture(PathBuf),
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_source: DataSource,

    /// openrouteservice API key. Empty means requests will be rejected
    /// upstream.
    pub ors_api_key: String,
    pub ors_base_url: Option<String>,
    pub ors_timeout_secs: u64,

    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_query_timeout: Duration,

    /// Timetable cache; `None` when disabled.
    pub cache: Option<CacheConfig>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's
    /// value or `None` if it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_source = match var("FIXTURE_PATH") {
            Some(path) => DataSource::Fixture(PathBuf::from(path)),
            None => var("DATABASE_URL")
                .or_else(|| var("POSTGRES_URL"))
                .map(DataSource::Postgres)
                .ok_or(ConfigError::MissingDatabaseUrl)?,
        };

        let cache = if parse_or(&var, "ENABLE_CACHE", true)? {
            let ttl = Duration::from_secs(parse_or(&var, "CACHE_TTL_SECS", 86_400)?);
            let capacity = parse_or(&var, "CACHE_MAX_CAPACITY", 10_000)?;
            Some(CacheConfig::new(ttl).with_max_capacity(capacity))
        } else {
            None
        };

        Ok(Self {
            port: parse_or(&var, "PORT", 8080)?,
            data_source,
            ors_api_key: var("ORS_API_KEY").unwrap_or_default(),
            ors_base_url: var("ORS_BASE_URL"),
            ors_timeout_secs: parse_or(&var, "ORS_TIMEOUT_SECS", 30)?,
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_or(
                &var,
                "DB_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
            db_query_timeout: Duration::from_secs(parse_or(&var, "DB_QUERY_TIMEOUT_SECS", 10)?),
            cache,
        })
    }

    pub fn ors(&self) -> OrsConfig {
        let config = OrsConfig::new(&self.ors_api_key).with_timeout(self.ors_timeout_secs);
        match &self.ors_base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    /// Pool settings, if the data source is Postgres.
    pub fn postgres(&self) -> Option<PostgresConfig> {
        match &self.data_source {
            DataSource::Postgres(url) => Some(
                PostgresConfig::new(url)
                    .with_max_connections(self.db_max_connections)
                    .with_acquire_timeout(self.db_acquire_timeout)
                    .with_statement_timeout(self.db_query_timeout),
            ),
            DataSource::Fixture(_) => None,
        }
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
