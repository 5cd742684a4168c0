use std::fs;

use userdesk_core::config::{validate_settings, ConfigValue};
use userdesk_core::{Config, ConfigError, Settings};

#[test]
fn yaml_values_are_typed_on_access() {
    let config = Config::from_yaml_str(
        "server:\n  addr: 0.0.0.0:9000\ndatabase:\n  max:\n    connections: 8\nlogging:\n  json: true\n",
        "test",
    )
    .unwrap();

    assert_eq!(config.get::<String>("server.addr").unwrap(), "0.0.0.0:9000");
    assert_eq!(config.get::<u32>("database.max.connections").unwrap(), 8);
    assert!(config.get::<bool>("logging.json").unwrap());
}

#[test]
fn missing_key_is_not_found() {
    let config = Config::empty();
    assert!(matches!(config.get::<String>("database.url"), Err(ConfigError::NotFound(_))));
    assert_eq!(config.get_or("uploads.dir", "uploads".to_string()).unwrap(), "uploads");
}

#[test]
fn wrong_type_is_reported_even_with_default() {
    let mut config = Config::empty();
    config.set("database.max.connections", ConfigValue::String("many".into()));
    let err = config.get_or::<u32>("database.max.connections", 5).unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { .. }));
}

#[test]
fn env_style_overlay_overrides_yaml() {
    let mut config = Config::from_yaml_str("public:\n  url: http://localhost:8000\n", "test").unwrap();
    config.overlay([("PUBLIC_URL".to_string(), "https://users.example.com".to_string())]);
    assert_eq!(config.get::<String>("public.url").unwrap(), "https://users.example.com");
}

#[test]
fn profile_file_overrides_base_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "uploads:\n  dir: uploads\n  max:\n    bytes: 100\n",
    )
    .unwrap();
    fs::write(dir.path().join("application-staging.yaml"), "uploads:\n  dir: /srv/pictures\n").unwrap();

    let config = Config::load_from(dir.path(), "staging").unwrap();
    assert_eq!(config.get::<String>("uploads.dir").unwrap(), "/srv/pictures");
    assert_eq!(config.get::<usize>("uploads.max.bytes").unwrap(), 100);
}

#[test]
fn dotenv_file_feeds_the_environment_overlay() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".env"), "USERDESK_CONFIG_TEST_MARKER=from-dotenv\n").unwrap();

    let config = Config::load_from(dir.path(), "dev").unwrap();
    assert_eq!(
        config.get::<String>("userdesk.config.test.marker").unwrap(),
        "from-dotenv"
    );
}

#[derive(garde::Validate)]
struct PoolSettings {
    #[garde(range(min = 1, max = 100))]
    max_connections: u32,
}

impl Settings for PoolSettings {
    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let settings = PoolSettings {
            max_connections: config.get_or("database.max.connections", 5)?,
        };
        validate_settings("database", &settings)?;
        Ok(settings)
    }
}

#[test]
fn settings_section_is_validated() {
    let config = Config::from_yaml_str("database:\n  max:\n    connections: 0\n", "test").unwrap();
    match config.section::<PoolSettings>() {
        Err(ConfigError::Validation(details)) => {
            assert_eq!(details[0].key, "database.max_connections");
        }
        other => panic!("expected validation error, got {:?}", other.map(|s| s.max_connections)),
    }

    let config = Config::empty();
    assert_eq!(config.section::<PoolSettings>().unwrap().max_connections, 5);
}
