//! Flag Provider Abstraction
//!
//! Unified interface over the external feature-flag service. The server side talks to
//! it with a secret SDK key, the operator console with a client-safe key; both are
//! reached through [`FlagProviderClient`] so handlers and the console receive the
//! provider as an explicit capability rather than global state. Targeting rules live
//! entirely on the provider side.

use crate::context::EvaluationContext;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

pub mod bootstrap;
pub mod client_side;
pub mod http;
pub mod memory;
pub mod server_sdk;

pub use client_side::ClientSideClient;
pub use memory::InMemoryProvider;
pub use server_sdk::ServerSdkClient;

/// Flag values keyed by provider flag key.
pub type FlagValues = serde_json::Map<String, serde_json::Value>;

/// Capability handed to request handlers and the console.
#[async_trait]
pub trait FlagProviderClient: Send + Sync {
    /// Block until the client is ready to evaluate, or fail.
    async fn wait_for_initialization(&self) -> Result<(), ApiError>;

    /// Whether initialization has completed successfully and the client is not closed.
    fn is_initialized(&self) -> bool;

    /// Evaluate one boolean flag. `default` is served when the provider has no usable
    /// value for the flag; an `Err` means the call itself failed.
    async fn variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: bool,
    ) -> Result<bool, ApiError>;

    /// Evaluate every flag visible to `context`.
    async fn all_flags(&self, context: &EvaluationContext) -> Result<FlagValues, ApiError>;

    /// Switch the active context and refresh live state.
    async fn identify(&self, context: EvaluationContext) -> Result<(), ApiError>;

    /// Release the client. Further evaluations fail.
    async fn close(&self) -> Result<(), ApiError>;

    /// Live flag state for the active context, when the client keeps one.
    fn subscribe(&self) -> Option<watch::Receiver<FlagValues>> {
        None
    }

    fn provider_name(&self) -> &str;
}

/// Provider connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Server-side secret key; unset means fallback-only mode
    #[serde(default)]
    pub sdk_key: Option<String>,

    /// Client-safe key handed out by `GET /api/client-sdk-key`
    #[serde(default)]
    pub client_sdk_key: Option<String>,

    /// Base URL for server-side evaluation
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for client-side evaluation
    #[serde(default = "default_client_base_url")]
    pub client_base_url: String,

    /// Upper bound on startup initialization
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: u64,

    /// Per-request timeout for evaluation calls
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://sdk.launchdarkly.com".to_string()
}

fn default_client_base_url() -> String {
    "https://clientsdk.launchdarkly.com".to_string()
}

fn default_init_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            sdk_key: None,
            client_sdk_key: None,
            base_url: default_base_url(),
            client_base_url: default_client_base_url(),
            init_timeout_ms: default_init_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ProviderConfig {
    /// Server key, treating blank values as unset.
    pub fn server_key(&self) -> Option<&str> {
        non_blank(self.sdk_key.as_deref())
    }

    /// Client key, treating blank values as unset.
    pub fn client_key(&self) -> Option<&str> {
        non_blank(self.client_sdk_key.as_deref())
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("base_url", &self.base_url),
            ("client_base_url", &self.client_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }
        if self.init_timeout_ms == 0 {
            return Err("init_timeout_ms must be greater than zero".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// Map transport errors from reqwest onto the provider error taxonomy
pub(crate) fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        match status.as_u16() {
            401 | 403 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", error)),
            _ => ApiError::ProviderRequestFailed(format!(
                "Request failed with status {}: {}",
                status, error
            )),
        }
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn build_provider_http_client(request_timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}
