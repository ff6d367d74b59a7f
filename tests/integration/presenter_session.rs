//! Operator console session tests: ticket ordering, fallback mode, HTTP store client

use super::test_utils::TestServer;
use async_trait::async_trait;
use flagbridge::catalog::{Catalog, CatalogListing};
use flagbridge::error::ApiError;
use flagbridge::evaluation::{ContextStore, EvaluationResponse};
use flagbridge::flags::EvaluationSource;
use flagbridge::presenter::console::run_once;
use flagbridge::presenter::{
    ContextStoreApi, HttpStoreClient, PresenterSession, RenderOptions, Selection,
};
use flagbridge::provider::{FlagProviderClient, InMemoryProvider, ProviderConfig};
use flagbridge::server::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Store whose flag responses are delayed per user id.
struct DelayedStore {
    inner: ContextStore,
    delays: HashMap<String, Duration>,
}

impl DelayedStore {
    fn new(delays: &[(&str, u64)]) -> Self {
        Self {
            inner: ContextStore::fallback_only(Arc::new(Catalog::demo())),
            delays: delays
                .iter()
                .map(|(user, ms)| (user.to_string(), Duration::from_millis(*ms)))
                .collect(),
        }
    }
}

#[async_trait]
impl ContextStoreApi for DelayedStore {
    async fn catalog(&self) -> Result<CatalogListing, ApiError> {
        Ok(self.inner.list_catalog())
    }

    async fn flags(&self, user_id: &str, org_id: &str) -> Result<EvaluationResponse, ApiError> {
        if let Some(delay) = self.delays.get(user_id) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.evaluate(user_id, org_id).await
    }

    async fn client_sdk_key(&self) -> Result<String, ApiError> {
        Err(ApiError::ClientKeyUnavailable)
    }
}

fn plain() -> RenderOptions {
    RenderOptions {
        color: false,
        development: false,
    }
}

#[tokio::test]
async fn test_slow_stale_response_does_not_overwrite_newer_selection() {
    let store: Arc<dyn ContextStoreApi> = Arc::new(DelayedStore::new(&[("user-1", 200)]));
    let session = PresenterSession::start(store, &ProviderConfig::default()).await;

    tokio::join!(
        session.select(Selection::new("user-1", "org-megabank")),
        session.select(Selection::new("user-2", "org-smallcorp")),
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.selection, Selection::new("user-2", "org-smallcorp"));
    let server = snapshot.server.expect("latest response applied");
    assert_eq!(server.context.user.id, "user-2");
    assert_eq!(server.context.organization.id, "org-smallcorp");
}

#[tokio::test]
async fn test_fallback_mode_never_touches_client_provider() {
    let provider = Arc::new(InMemoryProvider::new().with_flag("show-new-dashboard", true));
    provider.wait_for_initialization().await.unwrap();

    let store: Arc<dyn ContextStoreApi> = Arc::new(DelayedStore::new(&[]));
    // The store has no client key, so the session must stay in fallback mode even
    // though a provider exists elsewhere in the process.
    let session = PresenterSession::start(store, &ProviderConfig::default()).await;
    session.select(Selection::new("user-3", "org-megabank")).await;

    let snapshot = session.snapshot();
    assert!(snapshot.client.mode.is_fallback());
    assert!(!snapshot.client.connected);
    assert!(!snapshot.client.flags.show_new_dashboard);
    assert!(!snapshot.client.flags.enable_fraud_detection);
    assert!(!snapshot.client.flags.advanced_analytics);
    assert_eq!(provider.identify_calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_console_over_http_without_client_key() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let store: Arc<dyn ContextStoreApi> =
        Arc::new(HttpStoreClient::new(&server.base_url(), Duration::from_secs(5)).unwrap());

    let session = PresenterSession::start(store, &ProviderConfig::default()).await;
    let snapshot = session.snapshot();
    assert!(snapshot.error.is_none());
    assert!(snapshot.client.mode.is_fallback());

    let out = run_once(&session, Selection::default(), &plain(), false).await;
    assert!(out.contains("John Smith (analyst) @ MegaBank Corp (enterprise)"));
    assert!(out.contains("Fallback mode"));
    assert_eq!(
        session.snapshot().server.unwrap().evaluation_source,
        EvaluationSource::Fallback
    );

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_client_provider_falls_back() {
    let server =
        TestServer::spawn(AppState::with_provider(None, Some("client-side-id".to_string()))).await;
    let store: Arc<dyn ContextStoreApi> =
        Arc::new(HttpStoreClient::new(&server.base_url(), Duration::from_secs(5)).unwrap());
    let provider = ProviderConfig {
        client_base_url: "http://127.0.0.1:9".to_string(),
        init_timeout_ms: 500,
        request_timeout_ms: 500,
        ..ProviderConfig::default()
    };

    let session = PresenterSession::start(store, &provider).await;
    let snapshot = session.snapshot();
    assert!(snapshot.client.mode.is_fallback());
    assert!(snapshot.error.is_none(), "client provider failure is not blocking");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_store_shows_blocking_error() {
    let store: Arc<dyn ContextStoreApi> =
        Arc::new(HttpStoreClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap());
    let session = PresenterSession::start(store, &ProviderConfig::default()).await;

    let out = run_once(&session, Selection::default(), &plain(), false).await;
    assert!(out.contains("Failed to load demo data"));
    assert!(session.snapshot().server.is_none(), "no flag fetch after a failed catalog");
}

#[tokio::test]
async fn test_http_store_sends_ids_as_single_path_segments() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let store = HttpStoreClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();

    // "user-1/x" must reach the route as one id, not as an extra path segment
    let err = store.flags("user-1/x", "org-megabank").await.unwrap_err();
    assert!(err.to_string().contains("User or organization not found"));

    let response = store.flags("user-1", "org-megabank").await.unwrap();
    assert_eq!(response.context.user.id, "user-1");

    server.stop().await.unwrap();
}
