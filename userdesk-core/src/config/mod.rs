mod loader;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use value::{ConfigValue, FromConfigValue};

/// Environment variable that selects the active profile.
pub const PROFILE_ENV: &str = "USERDESK_PROFILE";

/// A single validation error detail from typed config validation.
#[derive(Debug, Clone)]
pub struct ConfigValidationDetail {
    pub key: String,
    pub message: String,
}

/// Why a key or a settings section could not be produced.
#[derive(Debug)]
pub enum ConfigError {
    /// No layer defines the key.
    NotFound(String),
    /// The key exists but holds a value of another type.
    TypeMismatch { key: String, expected: &'static str },
    /// A YAML file could not be read or parsed.
    Load(String),
    /// Constraint violations reported while building a typed settings struct.
    Validation(Vec<ConfigValidationDetail>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(
                f,
                "Config key not found: {key} (set env var `{}`)",
                key.to_uppercase().replace('.', "_")
            ),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Validation(details) => {
                write!(f, "Config validation errors:")?;
                for detail in details {
                    write!(f, "\n  - {}: {}", detail.key, detail.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Raw key-value configuration loaded from YAML files, `.env` files and
/// environment variables.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env` then `.env.{profile}` (loaded into the process environment,
///    never overwriting variables that are already set)
/// 4. Environment variables (`DATABASE_URL` overrides `database.url`)
///
/// Profile is determined by: `USERDESK_PROFILE` env var > argument.
#[derive(Debug, Clone)]
pub struct Config {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl Config {
    /// Load configuration for `profile` from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    /// Load configuration for `profile`, looking for YAML and `.env` files in `dir`.
    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let active_profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut values = HashMap::new();
        loader::load_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::load_yaml_file(&dir.join(format!("application-{active_profile}.yaml")), &mut values)?;

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{active_profile}")));

        loader::overlay_env(std::env::vars(), &mut values);

        tracing::debug!(profile = %active_profile, keys = values.len(), "configuration loaded");
        Ok(Config {
            values,
            profile: active_profile,
        })
    }

    /// Config holding only the keys of `yaml`.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(Config {
            values,
            profile: profile.to_string(),
        })
    }

    /// Config with no keys, profile `test`.
    pub fn empty() -> Self {
        Config {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    /// Insert or replace one key.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Apply `NAME=value` pairs the way process environment variables are applied.
    pub fn overlay<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        loader::overlay_env(vars, &mut self.values);
    }

    /// Typed value for a dotted key such as `database.url`.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, falling back to `default` only when the key is missing.
    ///
    /// A present value of the wrong type is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

        pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Build a typed settings section from this config.
    pub fn section<S: Settings>(&self) -> Result<S, ConfigError> {
        S::from_config(self)
    }
}

/// A strongly-typed settings struct assembled from raw config keys.
pub trait Settings: Sized {
    fn from_config(config: &Config) -> Result<Self, ConfigError>;
}

/// Run garde validation on a settings struct, keying each detail by `prefix.field`.
pub fn validate_settings<T>(prefix: &str, settings: &T) -> Result<(), ConfigError>
where
    T: garde::Validate,
    T::Context: Default,
{
    settings.validate().map_err(|report| {
        let details = report
            .iter()
            .map(|(path, error)| ConfigValidationDetail {
                key: if prefix.is_empty() {
                    path.to_string()
                } else {
                    format!("{prefix}.{path}")
                },
                message: error.message().to_string(),
            })
            .collect();
        ConfigError::Validation(details)
    })
}
