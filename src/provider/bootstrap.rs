//! Provider startup for both sides.
//!
//! The server blocks on initialization once; a missing key or a failed start leaves it
//! in fallback-only mode instead of aborting. The console builds its client-side
//! provider from the key served by the Context Store.

use super::{ClientSideClient, FlagProviderClient, ProviderConfig, ServerSdkClient};
use crate::context::EvaluationContext;
use crate::error::ApiError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Build and initialize the server-side provider from config.
///
/// Returns `None` when no key is configured or initialization fails.
pub async fn init_server_provider(
    config: &ProviderConfig,
) -> Option<Arc<dyn FlagProviderClient>> {
    let Some(sdk_key) = config.server_key() else {
        warn!("Provider SDK key not provided. Using fallback values.");
        return None;
    };

    let client = match ServerSdkClient::new(sdk_key.to_string(), config) {
        Ok(client) => Arc::new(client) as Arc<dyn FlagProviderClient>,
        Err(e) => {
            error!(error = %e, "Failed to create provider client");
            return None;
        }
    };

    initialize(client, config.init_timeout()).await
}

/// Wait for `client` to initialize within `timeout`. Failures are logged, not raised.
pub async fn initialize(
    client: Arc<dyn FlagProviderClient>,
    timeout: Duration,
) -> Option<Arc<dyn FlagProviderClient>> {
    match tokio::time::timeout(timeout, client.wait_for_initialization()).await {
        Ok(Ok(())) => {
            info!(
                provider = client.provider_name(),
                "Provider client initialized successfully"
            );
            Some(client)
        }
        Ok(Err(e)) => {
            error!(
                provider = client.provider_name(),
                error = %e,
                "Failed to initialize provider client"
            );
            None
        }
        Err(_) => {
            error!(
                provider = client.provider_name(),
                timeout_ms = timeout.as_millis() as u64,
                "Provider client initialization timed out"
            );
            None
        }
    }
}

/// Build and initialize the console's client-side provider for `client_key`.
pub async fn init_client_provider(
    client_key: &str,
    config: &ProviderConfig,
) -> Result<Arc<dyn FlagProviderClient>, ApiError> {
    let client = ClientSideClient::new(
        client_key.to_string(),
        EvaluationContext::anonymous(),
        config,
    )?;
    let client: Arc<dyn FlagProviderClient> = Arc::new(client);
    initialize(client, config.init_timeout()).await.ok_or_else(|| {
        ApiError::ProviderUnavailable("client provider failed to start".to_string())
    })
}
