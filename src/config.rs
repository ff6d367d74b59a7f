//! Configuration System
//!
//! Layered configuration built with the `config` crate: defaults, an optional global
//! file, optional workspace files (or one explicit file), `FLAGBRIDGE_*` environment
//! variables, and finally the flat deployment variables (`LAUNCHDARKLY_SDK_KEY`,
//! `LAUNCHDARKLY_CLIENT_SDK_KEY`, `HOST`, `PORT`, `CLIENT_URL`).

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub use crate::presenter::PresenterConfig;
pub use crate::provider::ProviderConfig;

mod facade;
mod merge;
mod sources;

pub use facade::{ConfigLoader, LoadOptions};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Flag provider connection
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Operator console settings
    #[serde(default)]
    pub presenter: PresenterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed to call the API cross-origin
    #[serde(default = "default_client_url")]
    pub client_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_client_url() -> String {
    "http://localhost:5173".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_url: default_client_url(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("port must be between 1 and 65535".to_string());
        }
        if !is_http_url(&self.client_url) {
            return Err(format!(
                "client_url must be an http(s) URL, got '{}'",
                self.client_url
            ));
        }
        Ok(())
    }
}

pub(crate) fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Server(String),
    Provider(String),
    Presenter(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Server(msg) => write!(f, "Server: {}", msg),
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Presenter(msg) => write!(f, "Presenter: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl BridgeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.server.validate() {
            errors.push(ValidationError::Server(e));
        }
        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.presenter.validate() {
            errors.push(ValidationError::Presenter(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.provider.sdk_key = copy.provider.sdk_key.as_deref().map(mask_secret);
        copy.provider.client_sdk_key = copy.provider.client_sdk_key.as_deref().map(mask_secret);
        copy
    }
}

fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
