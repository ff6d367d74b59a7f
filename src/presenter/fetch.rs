//! How the console reaches the Context Store.
//!
//! [`HttpStoreClient`] talks to a running server; [`LocalStoreClient`] wraps an
//! in-process [`ContextStore`] for the `--local` mode and tests.

use crate::catalog::CatalogListing;
use crate::error::ApiError;
use crate::evaluation::{ContextStore, EvaluationResponse};
use crate::server::routes::{ClientKeyResponse, ErrorBody};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait ContextStoreApi: Send + Sync {
    async fn catalog(&self) -> Result<CatalogListing, ApiError>;

    async fn flags(&self, user_id: &str, org_id: &str) -> Result<EvaluationResponse, ApiError>;

    async fn client_sdk_key(&self) -> Result<String, ApiError>;
}

pub struct HttpStoreClient {
    client: Client,
    base: Url,
    base_url: String,
}

impl HttpStoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| {
            ApiError::ConfigError(format!("Invalid Context Store URL '{}': {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::ConfigError(format!(
                "Invalid Context Store URL '{}': not a base URL",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::UpstreamFetch(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(url = %url, "Fetching from Context Store");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::UpstreamFetch(format!("GET {} failed: {}", url, e)))?;
        decode(url.as_str(), response).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        return Err(match status {
            StatusCode::SERVICE_UNAVAILABLE if url.ends_with("/api/client-sdk-key") => {
                ApiError::ClientKeyUnavailable
            }
            _ => ApiError::UpstreamFetch(format!("GET {} returned {}: {}", url, status, detail)),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::UpstreamFetch(format!("Invalid response from {}: {}", url, e)))
}

#[async_trait]
impl ContextStoreApi for HttpStoreClient {
    async fn catalog(&self) -> Result<CatalogListing, ApiError> {
        self.get_json(&["api", "demo-data"]).await
    }

    async fn flags(&self, user_id: &str, org_id: &str) -> Result<EvaluationResponse, ApiError> {
        self.get_json(&["api", "flags", user_id, org_id]).await
    }

    async fn client_sdk_key(&self) -> Result<String, ApiError> {
        let body: ClientKeyResponse = self.get_json(&["api", "client-sdk-key"]).await?;
        Ok(body.client_sdk_key)
    }
}

pub struct LocalStoreClient {
    store: Arc<ContextStore>,
    client_sdk_key: Option<String>,
}

impl LocalStoreClient {
    pub fn new(store: Arc<ContextStore>, client_sdk_key: Option<String>) -> Self {
        Self {
            store,
            client_sdk_key: client_sdk_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl ContextStoreApi for LocalStoreClient {
    async fn catalog(&self) -> Result<CatalogListing, ApiError> {
        Ok(self.store.list_catalog())
    }

    async fn flags(&self, user_id: &str, org_id: &str) -> Result<EvaluationResponse, ApiError> {
        self.store.evaluate(user_id, org_id).await
    }

    async fn client_sdk_key(&self) -> Result<String, ApiError> {
        self.client_sdk_key
            .clone()
            .ok_or(ApiError::ClientKeyUnavailable)
    }
}
