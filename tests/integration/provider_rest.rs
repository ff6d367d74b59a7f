//! REST provider clients against a local stand-in for the provider's evaluation API

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::any;
use axum::{Json, Router};
use flagbridge::audit::MemoryAuditSink;
use flagbridge::catalog::Catalog;
use flagbridge::context::{build_context, ContextShape, EvaluationContext};
use flagbridge::evaluation::ContextStore;
use flagbridge::flags::EvaluationSource;
use flagbridge::provider::bootstrap::{init_client_provider, init_server_provider};
use flagbridge::provider::{ClientSideClient, FlagProviderClient, ProviderConfig};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const SDK_KEY: &str = "sdk-test-key";
const CLIENT_ID: &str = "client-test-id";

#[derive(Default)]
struct Calls {
    server: AtomicUsize,
    client: AtomicUsize,
}

fn evaluations_for(context: &Value) -> Value {
    match context["user"]["key"].as_str() {
        Some("user-3") => json!({
            "show-new-dashboard": true,
            "advanced-analytics": {"value": true, "variation": 1, "version": 7}
        }),
        _ => json!({
            "show-new-dashboard": {"value": true, "variation": 0},
            "enable-fraud-detection": "not-a-bool"
        }),
    }
}

async fn server_eval(
    State(calls): State<Arc<Calls>>,
    method: Method,
    headers: HeaderMap,
    Json(context): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if method.as_str() != "REPORT" {
        return Err(StatusCode::METHOD_NOT_ALLOWED);
    }
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == SDK_KEY)
        .unwrap_or(false);
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    calls.server.fetch_add(1, Ordering::SeqCst);
    Ok(Json(evaluations_for(&context)))
}

async fn client_eval(
    State(calls): State<Arc<Calls>>,
    Path(client_id): Path<String>,
    method: Method,
    Json(context): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if method.as_str() != "REPORT" {
        return Err(StatusCode::METHOD_NOT_ALLOWED);
    }
    if client_id != CLIENT_ID {
        return Err(StatusCode::NOT_FOUND);
    }
    if context["user"].get("email").is_some() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if context["user"]["key"] == "user-1" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    calls.client.fetch_add(1, Ordering::SeqCst);
    Ok(Json(evaluations_for(&context)))
}

async fn spawn_fake_provider() -> (String, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let app = Router::new()
        .route("/sdk/evalx/context", any(server_eval))
        .route("/sdk/evalx/:client_id/context", any(client_eval))
        .with_state(calls.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}", addr), calls)
}

fn context_for(user_id: &str, org_id: &str, shape: ContextShape) -> EvaluationContext {
    let catalog = Catalog::demo();
    let (identity, tenant) = catalog.resolve(user_id, org_id).unwrap();
    build_context(identity, tenant, shape)
}

async fn ready_client(base: &str) -> ClientSideClient {
    let client = ClientSideClient::new(
        CLIENT_ID.to_string(),
        EvaluationContext::anonymous(),
        &provider_config(base, SDK_KEY),
    )
    .unwrap();
    client.wait_for_initialization().await.unwrap();
    client
}

fn provider_config(base: &str, sdk_key: &str) -> ProviderConfig {
    ProviderConfig {
        sdk_key: Some(sdk_key.to_string()),
        client_sdk_key: Some(CLIENT_ID.to_string()),
        base_url: base.to_string(),
        client_base_url: base.to_string(),
        init_timeout_ms: 2000,
        request_timeout_ms: 2000,
    }
}

#[tokio::test]
async fn test_server_client_evaluates_through_rest() {
    let (base, calls) = spawn_fake_provider().await;
    let provider = init_server_provider(&provider_config(&base, SDK_KEY))
        .await
        .expect("provider should initialize");
    assert!(provider.is_initialized());

    let audit = Arc::new(MemoryAuditSink::new());
    let store = ContextStore::new(Arc::new(Catalog::demo()), Some(provider), audit.clone());

    let response = store.evaluate("user-1", "org-megabank").await.unwrap();
    assert_eq!(response.evaluation_source, EvaluationSource::LaunchDarkly);
    assert!(response.flags.show_new_dashboard);
    assert!(!response.flags.enable_fraud_detection, "non-bool falls back to default");
    assert!(!response.flags.advanced_analytics, "missing flag falls back to default");
    assert_eq!(audit.len(), 1);

    let response = store.evaluate("user-3", "org-smallcorp").await.unwrap();
    assert!(response.flags.advanced_analytics);

    // one initialization call plus three variations per evaluation
    assert_eq!(calls.server.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn test_wrong_server_key_leaves_fallback_mode() {
    let (base, _) = spawn_fake_provider().await;
    let provider = init_server_provider(&provider_config(&base, "wrong-key")).await;
    assert!(provider.is_none());
}

#[tokio::test]
async fn test_client_side_identify_publishes_new_state() {
    let (base, calls) = spawn_fake_provider().await;
    let provider = init_client_provider(CLIENT_ID, &provider_config(&base, SDK_KEY))
        .await
        .expect("client provider should initialize");

    let rx = provider.subscribe().expect("client provider keeps live state");
    assert_eq!(rx.borrow().get("show-new-dashboard"), Some(&json!(true)));
    assert!(rx.borrow().get("advanced-analytics").is_none());

    provider
        .identify(context_for("user-3", "org-smallcorp", ContextShape::Redacted))
        .await
        .unwrap();
    assert_eq!(rx.borrow().get("advanced-analytics"), Some(&json!(true)));
    assert_eq!(calls.client.load(Ordering::SeqCst), 2);

    provider.close().await.unwrap();
    assert!(provider.all_flags(&EvaluationContext::anonymous()).await.is_err());
}

#[tokio::test]
async fn test_slow_identify_does_not_replace_newer_context() {
    let (base, calls) = spawn_fake_provider().await;
    let client = ready_client(&base).await;
    let rx = client.subscribe().unwrap();

    // user-1 answers slowly, so the user-3 identify issued after it lands first
    let (slow, fast) = tokio::join!(
        client.identify(context_for("user-1", "org-megabank", ContextShape::Redacted)),
        client.identify(context_for("user-3", "org-smallcorp", ContextShape::Redacted)),
    );
    slow.unwrap();
    fast.unwrap();

    assert_eq!(client.current_context().user_key(), "user-3");
    assert_eq!(rx.borrow().get("advanced-analytics"), Some(&json!(true)));
    assert!(rx.borrow().get("enable-fraud-detection").is_none());
    assert_eq!(calls.client.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_identify_keeps_previous_context_and_state() {
    let (base, _) = spawn_fake_provider().await;
    let client = ready_client(&base).await;
    client
        .identify(context_for("user-3", "org-smallcorp", ContextShape::Redacted))
        .await
        .unwrap();

    // the stand-in provider rejects contexts carrying an email
    let rejected = client
        .identify(context_for("user-2", "org-smallcorp", ContextShape::Full))
        .await;
    assert!(rejected.is_err());

    assert_eq!(client.current_context().user_key(), "user-3");
    let rx = client.subscribe().unwrap();
    assert_eq!(rx.borrow().get("advanced-analytics"), Some(&json!(true)));
}
