use std::net::SocketAddr;
use std::path::PathBuf;

use garde::Validate;
use userdesk_core::config::validate_settings;
use userdesk_core::{Config, ConfigError, Settings};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8000";

/// Process settings, assembled from the layered [`Config`].
#[derive(Debug, Clone, Validate)]
pub struct AppSettings {
    #[garde(skip)]
    pub addr: SocketAddr,
    #[garde(length(min = 1))]
    pub database_url: String,
    #[garde(range(min = 1, max = 100))]
    pub max_connections: u32,
    #[garde(skip)]
    pub upload_dir: PathBuf,
    #[garde(range(min = 1))]
    pub max_upload_bytes: usize,
    #[garde(url)]
    pub public_url: String,
    #[garde(skip)]
    pub json_logs: bool,
}

impl Settings for AppSettings {
    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let raw_addr: String = config.get_or("server.addr", DEFAULT_ADDR.to_string())?;
        let addr = raw_addr.parse().map_err(|_| ConfigError::TypeMismatch {
            key: "server.addr".to_string(),
            expected: "socket address",
        })?;
        let upload_dir: String = config.get_or("uploads.dir", DEFAULT_UPLOAD_DIR.to_string())?;

        let settings = Self {
            addr,
            database_url: config.get("database.url")?,
            max_connections: config.get_or("database.max.connections", DEFAULT_MAX_CONNECTIONS)?,
            upload_dir: PathBuf::from(upload_dir),
            max_upload_bytes: config.get_or("uploads.max.bytes", DEFAULT_MAX_UPLOAD_BYTES)?,
            public_url: config.get_or("public.url", DEFAULT_PUBLIC_URL.to_string())?,
            json_logs: config.get_or("logging.json", false)?,
        };
        validate_settings("", &settings)?;
        Ok(settings)
    }
}
