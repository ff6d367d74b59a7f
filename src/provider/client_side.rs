//! Client-side provider client (client-safe key).
//!
//! Keeps one active context. `identify` fetches the flag state for a new context and
//! commits both together, publishing the values on a watch channel. Only the most
//! recently issued identify may commit; a slower earlier one is dropped.

use super::http::fetch_evaluations;
use super::{build_provider_http_client, FlagProviderClient, FlagValues, ProviderConfig};
use crate::context::EvaluationContext;
use crate::error::ApiError;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info};

pub struct ClientSideClient {
    client: Client,
    client_id: String,
    base_url: String,
    issued: AtomicU64,
    context: RwLock<EvaluationContext>,
    state: watch::Sender<FlagValues>,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl ClientSideClient {
    pub fn new(
        client_id: String,
        initial_context: EvaluationContext,
        config: &ProviderConfig,
    ) -> Result<Self, ApiError> {
        let client = build_provider_http_client(config.request_timeout())?;
        let (state, _) = watch::channel(FlagValues::new());
        Ok(Self {
            client,
            client_id,
            base_url: config.client_base_url.trim_end_matches('/').to_string(),
            issued: AtomicU64::new(0),
            context: RwLock::new(initial_context),
            state,
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    fn evaluation_url(&self) -> String {
        format!("{}/sdk/evalx/{}/context", self.base_url, self.client_id)
    }

    /// Context the live state was last refreshed for.
    pub fn current_context(&self) -> EvaluationContext {
        self.context.read().clone()
    }

    /// Fetch values for `context` and commit them unless a newer refresh was issued
    /// meanwhile. Returns whether the commit happened.
    async fn refresh(&self, context: EvaluationContext) -> Result<bool, ApiError> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let values = self.all_flags(&context).await?;

        let mut active = self.context.write();
        if generation != self.issued.load(Ordering::SeqCst) {
            debug!(
                user = context.user_key(),
                org = context.organization_key(),
                generation,
                "Superseded client flag state dropped"
            );
            return Ok(false);
        }
        debug!(
            user = context.user_key(),
            org = context.organization_key(),
            flags = values.len(),
            "Client flag state refreshed"
        );
        *active = context;
        self.state.send_replace(values);
        Ok(true)
    }
}

#[async_trait]
impl FlagProviderClient for ClientSideClient {
    async fn wait_for_initialization(&self) -> Result<(), ApiError> {
        self.refresh(self.current_context()).await?;
        self.initialized.store(true, Ordering::SeqCst);
        info!("Client-side provider initialized");
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
        Ok(values
            .get(flag_key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default))
    }

    async fn all_flags(&self, context: &EvaluationContext) -> Result<FlagValues, ApiError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ApiError::ProviderUnavailable(
                "client has been closed".to_string(),
            ));
        }
        // Client-side ids are public; no Authorization header.
        fetch_evaluations(&self.client, &self.evaluation_url(), None, context).await
    }

    async fn identify(&self, context: EvaluationContext) -> Result<(), ApiError> {
        self.refresh(context).await.map(|_| ())
    }

    async fn close(&self) -> Result<(), ApiError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> Option<watch::Receiver<FlagValues>> {
        Some(self.state.subscribe())
    }

    fn provider_name(&self) -> &str {
        "launchdarkly-client"
    }
}
