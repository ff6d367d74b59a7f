use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::timestamp_now;
use crate::catalog::CatalogListing;
use crate::error::ApiError;
use crate::evaluation::EvaluationResponse;

use super::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    #[serde(rename = "launchDarkly")]
    pub launch_darkly: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientKeyResponse {
    #[serde(rename = "clientSdkKey")]
    pub client_sdk_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ClientKeyUnavailable | ApiError::ProviderUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::ProviderEvaluation { .. }
            | ApiError::ProviderError(_)
            | ApiError::ProviderRequestFailed(_)
            | ApiError::ProviderAuthFailed(_)
            | ApiError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Render(_) | ApiError::ConfigError(_) | ApiError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let connected = state.store.provider_connected();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: timestamp_now(),
        launch_darkly: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}

pub async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<CatalogListing> {
    Json(state.store.list_catalog())
}

pub async fn flags_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, org_id)): Path<(String, String)>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let response = state.store.evaluate(&user_id, &org_id).await.map_err(|e| {
        debug!(user_id = %user_id, org_id = %org_id, "Evaluation rejected: {}", e);
        e
    })?;
    Ok(Json(response))
}

pub async fn client_key_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClientKeyResponse>, ApiError> {
    match state.client_sdk_key.as_ref() {
        Some(key) => Ok(Json(ClientKeyResponse {
            client_sdk_key: key.clone(),
        })),
        None => {
            warn!("Client SDK key requested but not configured");
            Err(ApiError::ClientKeyUnavailable)
        }
    }
}
