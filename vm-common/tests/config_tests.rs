//! Configuration resolution tests
//!
//! Tests that touch VALUEMATRIX_* environment variables are marked #[serial]
//! so they never run in parallel with each other.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use vm_common::config::{
    load_toml_config, read_toml_config, resolve_gateway_api_key, resolve_root_folder, RootFolder,
    TomlConfig, CONFIG_ENV, DEFAULT_GATEWAY_BASE_URL, DEFAULT_GATEWAY_MODEL, GATEWAY_API_KEY_ENV,
    ROOT_FOLDER_ENV,
};

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_defaults_when_sections_missing() {
    let config: TomlConfig = toml::from_str("").unwrap();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.gateway.base_url, DEFAULT_GATEWAY_BASE_URL);
    assert_eq!(config.gateway.model, DEFAULT_GATEWAY_MODEL);
    assert!(config.gateway.api_key.is_none());
    assert!(config.gateway.timeout_secs.is_none());
    assert_eq!(config.proxy.port, 54321);
    assert_eq!(config.app.port, 8080);
    assert_eq!(config.app.session_ttl_secs, 3600);
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_full_config_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
root_folder = "/srv/valuematrix"

[logging]
level = "debug"

[gateway]
api_key = "sk-test"
base_url = "http://127.0.0.1:9999/v1"
model = "test-model"
timeout_secs = 20

[proxy]
host = "0.0.0.0"
port = 7001

[app]
port = 7000
proxy_url = "http://proxy.internal:7001"
session_ttl_secs = 600
"#,
    );

    let config = read_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/valuematrix")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.gateway.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.gateway.timeout_secs, Some(20));
    assert_eq!(config.proxy.base_url(), "http://0.0.0.0:7001");
    assert_eq!(config.app.host, "127.0.0.1");
    assert_eq!(config.app.proxy_url.as_deref(), Some("http://proxy.internal:7001"));
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[gateway\nmodel = ");

    assert!(read_toml_config(&path).is_err());
}

#[test]
#[serial]
fn test_explicit_config_must_exist() {
    env::remove_var(CONFIG_ENV);
    let result = load_toml_config(Some(Path::new("/nonexistent/valuematrix.toml")));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_config_path_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[logging]\nlevel = \"warn\"\n");

    env::set_var(CONFIG_ENV, &path);
    let config = load_toml_config(None).unwrap();
    env::remove_var(CONFIG_ENV);

    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial]
fn test_root_folder_priority() {
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    assert_eq!(
        resolve_root_folder(Some(Path::new("/from/cli")), &config),
        PathBuf::from("/from/cli")
    );
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/toml"));

    let fallback = resolve_root_folder(None, &TomlConfig::default());
    assert!(fallback.ends_with("valuematrix") || fallback.ends_with("valuematrix_data"));
}

#[test]
#[serial]
fn test_gateway_key_priority_and_blank_values() {
    let mut config = TomlConfig::default();
    config.gateway.api_key = Some("from-toml".to_string());

    env::set_var(GATEWAY_API_KEY_ENV, "from-env");
    assert_eq!(resolve_gateway_api_key(&config).as_deref(), Some("from-env"));

    env::set_var(GATEWAY_API_KEY_ENV, "   ");
    assert_eq!(resolve_gateway_api_key(&config).as_deref(), Some("from-toml"));

    env::remove_var(GATEWAY_API_KEY_ENV);
    config.gateway.api_key = Some("".to_string());
    assert!(resolve_gateway_api_key(&config).is_none());
}

#[test]
fn test_root_folder_created_with_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = RootFolder::new(dir.path().join("data"));

    root.ensure_exists().unwrap();
    assert!(dir.path().join("data").is_dir());
    assert_eq!(root.database_path(), dir.path().join("data").join("valuematrix.db"));
}
