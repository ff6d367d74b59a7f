//! Error types for the flagbridge evaluation service and operator console.

use thiserror::Error;

/// Errors surfaced by the Context Store, the provider clients and the Presenter.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User or organization not found")]
    NotFound {
        user_id: String,
        organization_id: String,
    },

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider evaluation failed for flag '{flag}': {message}")]
    ProviderEvaluation { flag: String, message: String },

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Client SDK key not configured")]
    ClientKeyUnavailable,

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    pub fn not_found(user_id: &str, organization_id: &str) -> Self {
        ApiError::NotFound {
            user_id: user_id.to_string(),
            organization_id: organization_id.to_string(),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
