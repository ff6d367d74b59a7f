//! Integration tests for Configuration System

use flagbridge::config::{BridgeConfig, ConfigLoader, LoadOptions};
use std::collections::HashMap;
use tempfile::TempDir;

fn options(root: &TempDir, env: &[(&str, &str)]) -> LoadOptions {
    LoadOptions {
        workspace_root: root.path().to_path_buf(),
        config_file: None,
        global_file: None,
        env: env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

#[test]
fn test_full_file_round_trips_into_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("flagbridge.toml");
    std::fs::write(
        &config_file,
        r#"
[server]
host = "127.0.0.1"
port = 8081
client_url = "http://console.example:5173"

[provider]
sdk_key = "sdk-from-file"
base_url = "http://provider.local"
init_timeout_ms = 1500

[presenter]
server_url = "http://127.0.0.1:8081"
color = false

[logging]
level = "debug"
format = "json"
output = "stderr"

[logging.modules]
hyper = "warn"
"#,
    )
    .unwrap();

    let mut opts = options(&temp_dir, &[]);
    opts.config_file = Some(config_file);
    let config = ConfigLoader::load_with(&opts).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.server.bind_address(), "127.0.0.1:8081");
    assert_eq!(config.provider.server_key(), Some("sdk-from-file"));
    assert!(config.provider.client_key().is_none());
    assert_eq!(config.provider.init_timeout_ms, 1500);
    assert_eq!(config.provider.request_timeout_ms, 10_000);
    assert_eq!(
        config.provider.client_base_url,
        "https://clientsdk.launchdarkly.com"
    );
    assert!(!config.presenter.color);
    assert_eq!(config.logging.format, "json");
    assert_eq!(
        config.logging.modules.get("hyper").map(String::as_str),
        Some("warn")
    );
}

#[test]
fn test_nested_environment_variables() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_with(&options(
        &temp_dir,
        &[
            ("FLAGBRIDGE_PROVIDER__INIT_TIMEOUT_MS", "2500"),
            ("FLAGBRIDGE_PRESENTER__DEVELOPMENT", "true"),
            ("FLAGBRIDGE_SERVER__PORT", "3100"),
        ],
    ))
    .unwrap();
    assert_eq!(config.provider.init_timeout_ms, 2500);
    assert!(config.presenter.development);
    assert_eq!(config.server.port, 3100);
}

#[test]
fn test_flat_port_beats_nested_port() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_with(&options(
        &temp_dir,
        &[("FLAGBRIDGE_SERVER__PORT", "3100"), ("PORT", "3200")],
    ))
    .unwrap();
    assert_eq!(config.server.port, 3200);
}

#[test]
fn test_invalid_values_are_reported_together() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_with(&options(
        &temp_dir,
        &[
            ("CLIENT_URL", "console.example"),
            ("FLAGBRIDGE_PROVIDER__REQUEST_TIMEOUT_MS", "0"),
        ],
    ))
    .unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_redacted_config_serializes_without_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let config: BridgeConfig = ConfigLoader::load_with(&options(
        &temp_dir,
        &[("LAUNCHDARKLY_SDK_KEY", "sdk-0123456789-secret")],
    ))
    .unwrap();
    let text = toml::to_string(&config.redacted()).unwrap();
    assert!(!text.contains("sdk-0123456789"));
    assert!(text.contains("****cret"));
}
