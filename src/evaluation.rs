//! Context Store: catalog listing and server-side flag evaluation.
//!
//! Evaluation is all-or-nothing. The three flags are requested concurrently; if any
//! call fails, every flag reverts to its default and the response is tagged
//! `fallback_error`. Only a fully provider-backed result is audited.

use crate::audit::{timestamp_now, AuditRecord, AuditSink, TracingAuditSink};
use crate::catalog::{Catalog, CatalogListing};
use crate::context::{build_context, ContextShape, EvaluationContext, ResponseContext};
use crate::error::ApiError;
use crate::flags::{EvaluationSource, FlagKey, FlagSet};
use crate::provider::FlagProviderClient;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Result of one evaluation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub flags: FlagSet,
    pub context: ResponseContext,
    pub evaluation_source: EvaluationSource,
    pub timestamp: String,
}

pub struct ContextStore {
    catalog: Arc<Catalog>,
    provider: Option<Arc<dyn FlagProviderClient>>,
    audit: Arc<dyn AuditSink>,
}

impl ContextStore {
    pub fn new(
        catalog: Arc<Catalog>,
        provider: Option<Arc<dyn FlagProviderClient>>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            catalog,
            provider,
            audit,
        }
    }

    /// Store with no provider; every evaluation is a fallback.
    pub fn fallback_only(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, None, Arc::new(TracingAuditSink))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn provider(&self) -> Option<&Arc<dyn FlagProviderClient>> {
        self.provider.as_ref()
    }

    /// Whether evaluations currently go to the provider.
    pub fn provider_connected(&self) -> bool {
        self.provider
            .as_ref()
            .map(|p| p.is_initialized())
            .unwrap_or(false)
    }

    pub fn list_catalog(&self) -> CatalogListing {
        self.catalog.listing()
    }

    pub async fn evaluate(
        &self,
        identity_id: &str,
        tenant_id: &str,
    ) -> Result<EvaluationResponse, ApiError> {
        let (identity, tenant) = self
            .catalog
            .resolve(identity_id, tenant_id)
            .ok_or_else(|| ApiError::not_found(identity_id, tenant_id))?;

        let context = build_context(identity, tenant, ContextShape::Full);
        let timestamp = timestamp_now();

        let (flags, evaluation_source) = match self.provider.as_ref().filter(|p| p.is_initialized())
        {
            None => (FlagSet::defaults(), EvaluationSource::Fallback),
            Some(provider) => match evaluate_all(provider.as_ref(), &context).await {
                Ok(flags) => {
                    self.audit.record(AuditRecord::flag_evaluation(
                        &identity.id,
                        &identity.role,
                        &tenant.id,
                        &tenant.tier,
                        flags,
                        EvaluationSource::LaunchDarkly,
                        timestamp.clone(),
                    ));
                    (flags, EvaluationSource::LaunchDarkly)
                }
                Err(e) => {
                    error!(
                        user_id = %identity.id,
                        organization_id = %tenant.id,
                        error = %e,
                        "Error evaluating flags"
                    );
                    (FlagSet::defaults(), EvaluationSource::FallbackError)
                }
            },
        };

        debug!(
            user_id = %identity.id,
            organization_id = %tenant.id,
            source = %evaluation_source,
            "Evaluation finished"
        );

        Ok(EvaluationResponse {
            flags,
            context: ResponseContext::new(identity, tenant),
            evaluation_source,
            timestamp,
        })
    }
}

/// Evaluate every known flag concurrently. The first failure fails the whole set.
pub async fn evaluate_all(
    provider: &dyn FlagProviderClient,
    context: &EvaluationContext,
) -> Result<FlagSet, ApiError> {
    let results = join_all(
        FlagKey::ALL
            .iter()
            .map(|key| provider.variation(key.as_str(), context, key.default_value())),
    )
    .await;

    let mut flags = FlagSet::defaults();
    for (key, result) in FlagKey::ALL.into_iter().zip(results) {
        flags.set(key, result?);
    }
    Ok(flags)
}
