//! Connection pool construction for the `sqlx::Any` driver.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::error::{DataError, SqlxErrorExt};

/// The database engine behind a connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Detect the engine from the URL scheme.
    pub fn from_url(url: &str) -> Result<Self, DataError> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(DataError::database(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unsupported database scheme '{other}'"),
            ))),
        }
    }
}

/// Connection settings handed to [`connect`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a pool for `config.url`, returning it with the detected backend.
pub async fn connect(config: &PoolConfig) -> Result<(AnyPool, Backend), DataError> {
    let backend = Backend::from_url(&config.url)?;
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(SqlxErrorExt::into_data_error)?;

    tracing::info!(?backend, max_connections = config.max_connections, "database pool ready");
    Ok((pool, backend))
}
