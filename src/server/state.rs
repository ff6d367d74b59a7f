use std::sync::Arc;

use crate::audit::{AuditSink, TracingAuditSink};
use crate::catalog::Catalog;
use crate::evaluation::ContextStore;
use crate::provider::FlagProviderClient;

/// Shared, read-only request state.
pub struct AppState {
    pub store: ContextStore,
    pub client_sdk_key: Option<String>,
}

impl AppState {
    pub fn new(store: ContextStore, client_sdk_key: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            store,
            client_sdk_key: client_sdk_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// State over the demo catalog with the production audit sink.
    pub fn with_provider(
        provider: Option<Arc<dyn FlagProviderClient>>,
        client_sdk_key: Option<String>,
    ) -> Arc<Self> {
        Self::with_audit(provider, client_sdk_key, Arc::new(TracingAuditSink))
    }

    pub fn with_audit(
        provider: Option<Arc<dyn FlagProviderClient>>,
        client_sdk_key: Option<String>,
        audit: Arc<dyn AuditSink>,
    ) -> Arc<Self> {
        let store = ContextStore::new(Arc::new(Catalog::demo()), provider, audit);
        Self::new(store, client_sdk_key)
    }
}
