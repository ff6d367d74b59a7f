//! Console state and its transitions.
//!
//! Two fetch lifecycles hang off the selection: the server flag fetch and the client
//! provider identify. Each begins by issuing a [`Ticket`]; a result is applied only
//! if its ticket is still the latest issued for that lifecycle.

use crate::catalog::{CatalogListing, IdentitySummary, Tenant};
use crate::context::{
    build_context, ContextShape, EvaluationContext, OrganizationContext, UserContext,
};
use crate::error::ApiError;
use crate::evaluation::EvaluationResponse;
use crate::flags::FlagSet;
use crate::provider::FlagValues;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub user_id: String,
    pub org_id: String,
}

impl Selection {
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: org_id.into(),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new("user-1", "org-megabank")
    }
}

/// Request sequence token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// How client-side flags are obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClientMode {
    /// Embedded provider is running.
    Live,
    /// No provider; fixed default values.
    Fallback { reason: String },
}

impl ClientMode {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ClientMode::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PresenterState {
    selection: Selection,
    catalog: Option<CatalogListing>,
    server_flags: Option<EvaluationResponse>,
    client_flags: FlagSet,
    client_mode: ClientMode,
    error: Option<String>,
    next_ticket: u64,
    latest_server: Option<Ticket>,
    latest_client: Option<Ticket>,
    client_pending: bool,
}

impl PresenterState {
    pub fn new(client_mode: ClientMode) -> Self {
        Self {
            selection: Selection::default(),
            catalog: None,
            server_flags: None,
            client_flags: FlagSet::defaults(),
            client_mode,
            error: None,
            next_ticket: 0,
            latest_server: None,
            latest_client: None,
            client_pending: false,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn catalog(&self) -> Option<&CatalogListing> {
        self.catalog.as_ref()
    }

    pub fn server_flags(&self) -> Option<&EvaluationResponse> {
        self.server_flags.as_ref()
    }

    pub fn client_mode(&self) -> &ClientMode {
        &self.client_mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Catalog is fetched once; failure is terminal.
    pub fn apply_catalog(&mut self, result: Result<CatalogListing, ApiError>) {
        match result {
            Ok(catalog) => self.catalog = Some(catalog),
            Err(e) => {
                debug!(error = %e, "Catalog fetch failed");
                self.error = Some("Failed to load demo data".to_string());
            }
        }
    }

    fn issue(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    pub fn begin_server_fetch(&mut self) -> Ticket {
        let ticket = self.issue();
        self.latest_server = Some(ticket);
        ticket
    }

    /// Apply a server flag result. Returns false when the ticket is stale.
    pub fn apply_server_flags(
        &mut self,
        ticket: Ticket,
        result: Result<EvaluationResponse, ApiError>,
    ) -> bool {
        if self.latest_server != Some(ticket) {
            debug!(?ticket, "Discarding stale server flag response");
            return false;
        }
        match result {
            Ok(response) => self.server_flags = Some(response),
            Err(e) => {
                debug!(error = %e, "Server flag fetch failed");
                self.error = Some("Failed to load server flags".to_string());
            }
        }
        true
    }

    pub fn begin_client_identify(&mut self) -> Ticket {
        let ticket = self.issue();
        self.latest_client = Some(ticket);
        self.client_pending = true;
        ticket
    }

    /// Apply client flag values from an identify. Returns false when stale or when the
    /// console is in fallback mode.
    pub fn apply_client_flags(&mut self, ticket: Ticket, values: &FlagValues) -> bool {
        if self.client_mode.is_fallback() || self.latest_client != Some(ticket) {
            return false;
        }
        self.client_flags = FlagSet::from_values(values);
        self.client_pending = false;
        true
    }

    /// An identify finished without values. Keeps the last known flags.
    pub fn finish_client_identify(&mut self, ticket: Ticket) {
        if self.latest_client == Some(ticket) {
            self.client_pending = false;
        }
    }

    /// Take a pushed provider state. Ignored while an identify is in flight so values
    /// for an older context cannot land over a newer selection.
    pub fn apply_live_flags(&mut self, values: &FlagValues) -> bool {
        if self.client_mode.is_fallback() || self.client_pending {
            return false;
        }
        self.client_flags = FlagSet::from_values(values);
        true
    }

    /// Client flag values to display.
    pub fn client_flags(&self) -> FlagSet {
        if self.client_mode.is_fallback() {
            FlagSet::defaults()
        } else {
            self.client_flags
        }
    }

    pub fn current_identity(&self) -> Option<&IdentitySummary> {
        self.catalog
            .as_ref()?
            .find_identity(&self.selection.user_id)
    }

    pub fn current_tenant(&self) -> Option<&Tenant> {
        self.catalog.as_ref()?.find_tenant(&self.selection.org_id)
    }

    /// Client-shaped context for the current selection. Unknown halves show the
    /// placeholder values.
    pub fn display_context(&self) -> EvaluationContext {
        let placeholder = EvaluationContext::placeholder();
        match (self.current_identity(), self.current_tenant()) {
            (Some(identity), Some(tenant)) => {
                build_context(identity, tenant, ContextShape::Redacted)
            }
            (Some(identity), None) => EvaluationContext {
                user: UserContext {
                    key: identity.id.clone(),
                    name: identity.name.clone(),
                    email: None,
                    role: Some(identity.role.clone()),
                    anonymous: false,
                },
                ..placeholder
            },
            (None, Some(tenant)) => EvaluationContext {
                organization: OrganizationContext {
                    key: tenant.id.clone(),
                    name: tenant.name.clone(),
                    tier: tenant.tier.clone(),
                    industry: Some(tenant.industry.clone()),
                },
                ..placeholder
            },
            (None, None) => placeholder,
        }
    }

    /// Context to identify the client provider with, if the selection resolves.
    pub fn client_context(&self) -> Option<EvaluationContext> {
        let identity = self.current_identity()?;
        let tenant = self.current_tenant()?;
        Some(build_context(identity, tenant, ContextShape::Redacted))
    }

    pub fn snapshot(&self) -> PresenterSnapshot {
        let connected = !self.client_mode.is_fallback();
        PresenterSnapshot {
            selection: self.selection.clone(),
            identity: self.current_identity().cloned(),
            tenant: self.current_tenant().cloned(),
            context: self.display_context(),
            server: self.server_flags.clone(),
            client: ClientSnapshot {
                mode: self.client_mode.clone(),
                connected,
                flags: self.client_flags(),
            },
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    #[serde(flatten)]
    pub mode: ClientMode,
    pub connected: bool,
    pub flags: FlagSet,
}

/// Everything a render needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenterSnapshot {
    pub selection: Selection,
    pub identity: Option<IdentitySummary>,
    pub tenant: Option<Tenant>,
    pub context: EvaluationContext,
    pub server: Option<EvaluationResponse>,
    pub client: ClientSnapshot,
    pub error: Option<String>,
}
