//! Server-side provider client (secret SDK key).

use super::http::fetch_evaluations;
use super::{build_provider_http_client, FlagProviderClient, FlagValues, ProviderConfig};
use crate::context::EvaluationContext;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Evaluates flags through the provider's server-side evaluation endpoint.
pub struct ServerSdkClient {
    client: Client,
    sdk_key: String,
    base_url: String,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl ServerSdkClient {
    pub fn new(sdk_key: String, config: &ProviderConfig) -> Result<Self, ApiError> {
        let client = build_provider_http_client(config.request_timeout())?;
        Ok(Self {
            client,
            sdk_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    fn evaluation_url(&self) -> String {
        format!("{}/sdk/evalx/context", self.base_url)
    }

    fn ensure_open(&self) -> Result<(), ApiError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ApiError::ProviderUnavailable(
                "server client has been closed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FlagProviderClient for ServerSdkClient {
    async fn wait_for_initialization(&self) -> Result<(), ApiError> {
        self.ensure_open()?;
        // One evaluation round-trip proves the key and the endpoint.
        fetch_evaluations(
            &self.client,
            &self.evaluation_url(),
            Some(&self.sdk_key),
            &EvaluationContext::anonymous(),
        )
        .await?;
        self.initialized.store(true, Ordering::SeqCst);
        info!(base_url = %self.base_url, "Server provider client initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
    }

    async fn variation(
        &self,
        flag_key: &str,
        context: &EvaluationContext,
        default: bool,
    ) -> Result<bool, ApiError> {
        let values = self.all_flags(context).await?;
        let value = values.get(flag_key).and_then(|v| v.as_bool());
        if value.is_none() {
            debug!(flag = flag_key, "Flag missing or not boolean, serving default");
        }
        Ok(value.unwrap_or(default))
    }

    async fn all_flags(&self, context: &EvaluationContext) -> Result<FlagValues, ApiError> {
        self.ensure_open()?;
        fetch_evaluations(
            &self.client,
            &self.evaluation_url(),
            Some(&self.sdk_key),
            context,
        )
        .await
    }

    async fn identify(&self, context: EvaluationContext) -> Result<(), ApiError> {
        // Server clients are stateless per context.
        debug!(user = context.user_key(), "identify on server client is a no-op");
        Ok(())
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "launchdarkly-server"
    }
}
