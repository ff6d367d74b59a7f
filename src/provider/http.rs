//! REST evaluation calls shared by the server and client-side provider clients.
//!
//! Both clients send the context as the body of a `REPORT` request and get back an
//! object keyed by flag key. Entries are either bare values or detail objects with a
//! `value` field; both are normalized to bare values.

use super::{map_http_error, FlagValues};
use crate::context::EvaluationContext;
use crate::error::ApiError;
use reqwest::{Client, Method};
use serde_json::Value;

fn report_method() -> Result<Method, ApiError> {
    Method::from_bytes(b"REPORT")
        .map_err(|e| ApiError::ProviderError(format!("Invalid HTTP method: {}", e)))
}

/// Evaluate all flags for `context` at `url`.
pub(crate) async fn fetch_evaluations(
    client: &Client,
    url: &str,
    authorization: Option<&str>,
    context: &EvaluationContext,
) -> Result<FlagValues, ApiError> {
    let mut request = client
        .request(report_method()?, url)
        .header("Content-Type", "application/json")
        .json(context);
    if let Some(key) = authorization {
        request = request.header("Authorization", key);
    }

    let response = request.send().await.map_err(map_http_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(match status.as_u16() {
            401 | 403 => {
                ApiError::ProviderAuthFailed(format!("Authentication failed: {}", error_text))
            }
            _ => ApiError::ProviderRequestFailed(format!(
                "Request failed with status {}: {}",
                status, error_text
            )),
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

    normalize_evaluations(body)
}

pub(crate) fn normalize_evaluations(body: Value) -> Result<FlagValues, ApiError> {
    let Value::Object(entries) = body else {
        return Err(ApiError::ProviderError(
            "Evaluation response is not an object".to_string(),
        ));
    };

    Ok(entries
        .into_iter()
        .map(|(key, entry)| {
            let value = match entry {
                Value::Object(mut detail) if detail.contains_key("value") => {
                    detail.remove("value").unwrap_or(Value::Null)
                }
                other => other,
            };
            (key, value)
        })
        .collect())
}
