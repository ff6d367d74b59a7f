//! Console session: owns the state, the store handle and the embedded client provider.

use super::fetch::ContextStoreApi;
use super::state::{ClientMode, PresenterSnapshot, PresenterState, Selection, Ticket};
use crate::context::EvaluationContext;
use crate::error::ApiError;
use crate::provider::bootstrap::init_client_provider;
use crate::provider::{FlagProviderClient, FlagValues, ProviderConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PresenterSession {
    store: Arc<dyn ContextStoreApi>,
    client: Option<Arc<dyn FlagProviderClient>>,
    state: Arc<Mutex<PresenterState>>,
}

impl PresenterSession {
    /// Fetch the client key, start the client provider (or enter fallback mode), then
    /// load the catalog once.
    pub async fn start(store: Arc<dyn ContextStoreApi>, provider: &ProviderConfig) -> Self {
        let (client, mode) = match store.client_sdk_key().await {
            Ok(key) => match init_client_provider(&key, provider).await {
                Ok(client) => (Some(client), ClientMode::Live),
                Err(e) => {
                    warn!(error = %e, "Client provider failed to start, using fallback mode");
                    (None, ClientMode::Fallback { reason: e.to_string() })
                }
            },
            Err(e) => {
                warn!(error = %e, "No client SDK key available, using fallback mode");
                (None, ClientMode::Fallback { reason: e.to_string() })
            }
        };

        let session = Self::with_parts(store, client, mode);
        session.load_catalog().await;
        session
    }

    /// Session around an already initialized client provider. `None` means fallback mode.
    pub fn with_client(
        store: Arc<dyn ContextStoreApi>,
        client: Option<Arc<dyn FlagProviderClient>>,
    ) -> Self {
        let mode = match client {
            Some(_) => ClientMode::Live,
            None => ClientMode::Fallback {
                reason: ApiError::ClientKeyUnavailable.to_string(),
            },
        };
        Self::with_parts(store, client, mode)
    }

    fn with_parts(
        store: Arc<dyn ContextStoreApi>,
        client: Option<Arc<dyn FlagProviderClient>>,
        mode: ClientMode,
    ) -> Self {
        Self {
            store,
            client,
            state: Arc::new(Mutex::new(PresenterState::new(mode))),
        }
    }

    pub async fn load_catalog(&self) {
        let result = self.store.catalog().await;
        if let Ok(catalog) = &result {
            info!(
                users = catalog.identities.len(),
                organizations = catalog.tenants.len(),
                "Catalog loaded"
            );
        }
        self.state.lock().apply_catalog(result);
    }

    pub fn selection(&self) -> Selection {
        self.state.lock().selection().clone()
    }

    /// Change the selection, then re-fetch server flags and re-identify the client
    /// provider concurrently.
    pub async fn select(&self, selection: Selection) {
        let (server_ticket, client_job) = {
            let mut state = self.state.lock();
            state.set_selection(selection.clone());
            let server_ticket = state.begin_server_fetch();
            let client_job = match (&self.client, state.client_context()) {
                (Some(_), Some(context)) => Some((state.begin_client_identify(), context)),
                _ => None,
            };
            (server_ticket, client_job)
        };

        let (server_result, client_result) = tokio::join!(
            self.store.flags(&selection.user_id, &selection.org_id),
            self.identify(client_job)
        );

        let mut state = self.state.lock();
        state.apply_server_flags(server_ticket, server_result);
        if let Some((ticket, values)) = client_result {
            match values {
                Some(values) => {
                    state.apply_client_flags(ticket, &values);
                }
                None => state.finish_client_identify(ticket),
            }
        }
    }

    /// Re-run the current selection.
    pub async fn refresh(&self) {
        let selection = self.selection();
        self.select(selection).await;
    }

    /// Start over: clear state, reload the catalog and re-select.
    pub async fn reload(&self) {
        {
            let mut state = self.state.lock();
            let selection = state.selection().clone();
            let mode = state.client_mode().clone();
            *state = PresenterState::new(mode);
            state.set_selection(selection);
        }
        self.load_catalog().await;
        if self.state.lock().error().is_none() {
            self.refresh().await;
        }
    }

    async fn identify(
        &self,
        job: Option<(Ticket, EvaluationContext)>,
    ) -> Option<(Ticket, Option<FlagValues>)> {
        let (ticket, context) = job?;
        let client = self.client.as_ref()?;

        if let Err(e) = client.identify(context.clone()).await {
            warn!(user = context.user_key(), error = %e, "Client provider identify failed");
            return Some((ticket, None));
        }

        let values = match client.subscribe() {
            Some(rx) => {
                let values = rx.borrow().clone();
                values
            }
            None => match client.all_flags(&context).await {
                Ok(values) => values,
                Err(e) => {
                    warn!(user = context.user_key(), error = %e, "Client flag read failed");
                    return Some((ticket, None));
                }
            },
        };
        debug!(user = context.user_key(), "Client provider identified");
        Some((ticket, Some(values)))
    }

    /// Pull the client provider's latest pushed state into the view.
    pub fn sync_live_flags(&self) -> bool {
        let Some(rx) = self.client.as_ref().and_then(|c| c.subscribe()) else {
            return false;
        };
        let values = rx.borrow().clone();
        self.state.lock().apply_live_flags(&values)
    }

    pub fn snapshot(&self) -> PresenterSnapshot {
        self.state.lock().snapshot()
    }

    pub fn state(&self) -> Arc<Mutex<PresenterState>> {
        self.state.clone()
    }

    pub async fn shutdown(&self) {
        if let Some(client) = self.client.as_ref() {
            if let Err(e) = client.close().await {
                warn!(error = %e, "Failed to close client provider");
            }
        }
    }
}
