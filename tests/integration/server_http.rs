//! HTTP surface tests against the real router on an ephemeral port

use super::test_utils::{TestServer, CONSOLE_ORIGIN};
use flagbridge::audit::MemoryAuditSink;
use flagbridge::provider::{FlagProviderClient, InMemoryProvider};
use flagbridge::server::AppState;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = reqwest::get(server.url(path)).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn ready_provider(provider: InMemoryProvider) -> Arc<InMemoryProvider> {
    provider.wait_for_initialization().await.unwrap();
    Arc::new(provider)
}

#[tokio::test]
async fn test_health_reports_disconnected_without_provider() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["launchDarkly"], "disconnected");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_demo_data_lists_catalog_without_emails() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let (status, body) = get(&server, "/api/demo-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);
    assert_eq!(body["organizations"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["users"][0],
        json!({"id": "user-1", "name": "John Smith", "role": "analyst"})
    );
    assert!(!body.to_string().contains('@'));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_flags_without_provider_serve_fallback() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let (status, mut body) = get(&server, "/api/flags/user-2/org-smallcorp").await;
    assert_eq!(status, StatusCode::OK);

    let timestamp = body
        .as_object_mut()
        .unwrap()
        .remove("timestamp")
        .unwrap();
    assert!(timestamp.as_str().unwrap().contains('T'));
    assert_eq!(
        body,
        json!({
            "flags": {
                "show-new-dashboard": false,
                "enable-fraud-detection": false,
                "advanced-analytics": false
            },
            "context": {
                "user": {"id": "user-2", "name": "Jane Doe", "role": "manager"},
                "organization": {
                    "id": "org-smallcorp",
                    "name": "Small Corp",
                    "tier": "starter",
                    "industry": "fintech"
                }
            },
            "evaluationSource": "fallback"
        })
    );
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let (status, body) = get(&server, "/api/flags/user-9/org-megabank").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User or organization not found"}));

    let (status, _) = get(&server, "/api/flags/user-1/org-nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_client_key_missing_is_503() {
    let server = TestServer::spawn(AppState::with_provider(None, Some("   ".to_string()))).await;
    let (status, body) = get(&server, "/api/client-sdk-key").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Client SDK key not configured"}));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_client_key_is_served_when_configured() {
    let server =
        TestServer::spawn(AppState::with_provider(None, Some("client-side-id".to_string()))).await;
    let (status, body) = get(&server, "/api/client-sdk-key").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"clientSdkKey": "client-side-id"}));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_cors_allows_only_console_origin() {
    let server = TestServer::spawn(AppState::with_provider(None, None)).await;
    let client = reqwest::Client::new();

    let allowed = client
        .get(server.url("/health"))
        .header("Origin", CONSOLE_ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        CONSOLE_ORIGIN
    );
    assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");

    let denied = client
        .get(server.url("/health"))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .unwrap();
    // exact-origin policy: the configured console origin is echoed, never the caller's
    let echoed = denied.headers()["access-control-allow-origin"]
        .to_str()
        .unwrap();
    assert_eq!(echoed, CONSOLE_ORIGIN);
    assert_ne!(echoed, "http://evil.example");
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_provider_values_are_served_and_audited() {
    let provider = ready_provider(
        InMemoryProvider::new()
            .with_flag("enable-fraud-detection", true)
            .with_user_override("user-3", "advanced-analytics", true),
    )
    .await;
    let audit = Arc::new(MemoryAuditSink::new());
    let state = AppState::with_audit(Some(provider.clone()), None, audit.clone());
    let server = TestServer::spawn(state).await;

    let (_, health) = get(&server, "/health").await;
    assert_eq!(health["launchDarkly"], "connected");

    let (status, body) = get(&server, "/api/flags/user-3/org-smallcorp").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evaluationSource"], "launchdarkly");
    assert_eq!(
        body["flags"],
        json!({
            "show-new-dashboard": false,
            "enable-fraud-detection": true,
            "advanced-analytics": true
        })
    );

    let records = audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, "user-3");
    assert_eq!(records[0].user_role, "admin");
    assert_eq!(records[0].organization_id, "org-smallcorp");

    server.stop().await.unwrap();
    assert!(provider.is_closed(), "shutdown should close the provider");
}

#[tokio::test]
async fn test_failing_flag_degrades_whole_response() {
    let provider = ready_provider(
        InMemoryProvider::new()
            .with_flag("show-new-dashboard", true)
            .with_failing_flag("advanced-analytics"),
    )
    .await;
    let audit = Arc::new(MemoryAuditSink::new());
    let server = TestServer::spawn(AppState::with_audit(Some(provider), None, audit.clone())).await;

    let (status, body) = get(&server, "/api/flags/user-1/org-megabank").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evaluationSource"], "fallback_error");
    assert_eq!(body["flags"]["show-new-dashboard"], false);
    assert!(audit.is_empty());
    server.stop().await.unwrap();
}
