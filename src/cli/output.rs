//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::config::ValidationError;
use crate::error::ApiError;

/// Map domain/service errors to a single line for stderr.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::NotFound {
            user_id,
            organization_id,
        } => format!("{} ({} / {})", e, user_id, organization_id),
        _ => e.to_string(),
    }
}

pub fn map_validation_errors(errors: &[ValidationError]) -> ApiError {
    let joined = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    ApiError::ConfigError(format!("Invalid configuration: {}", joined))
}
