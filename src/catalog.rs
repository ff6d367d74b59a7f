//! Identity and tenant catalog.
//!
//! A fixed, read-only set of demo users and organizations. Built once at startup and
//! shared behind an `Arc`; nothing mutates it for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// A user that can be selected as the evaluation subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Public view of an identity. Never carries the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            role: identity.role.clone(),
        }
    }
}

/// An organization the user acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub tier: String,
    pub industry: String,
}

/// Catalog listing as returned by `GET /api/demo-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogListing {
    #[serde(rename = "users")]
    pub identities: Vec<IdentitySummary>,
    #[serde(rename = "organizations")]
    pub tenants: Vec<Tenant>,
}

impl CatalogListing {
    pub fn find_identity(&self, id: &str) -> Option<&IdentitySummary> {
        self.identities.iter().find(|i| i.id == id)
    }

    pub fn find_tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }
}

/// In-memory catalog of identities and tenants, in declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    identities: Vec<Identity>,
    tenants: Vec<Tenant>,
}

impl Catalog {
    pub fn new(identities: Vec<Identity>, tenants: Vec<Tenant>) -> Self {
        Self {
            identities,
            tenants,
        }
    }

    /// The demo catalog: three users across two organizations.
    pub fn demo() -> Self {
        let identity = |id: &str, name: &str, email: &str, role: &str| Identity {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        };
        let tenant = |id: &str, name: &str, tier: &str, industry: &str| Tenant {
            id: id.to_string(),
            name: name.to_string(),
            tier: tier.to_string(),
            industry: industry.to_string(),
        };

        Self::new(
            vec![
                identity("user-1", "John Smith", "john.smith@megabank.com", "analyst"),
                identity("user-2", "Jane Doe", "jane.doe@megabank.com", "manager"),
                identity("user-3", "Bob Wilson", "bob.wilson@smallcorp.com", "admin"),
            ],
            vec![
                tenant("org-megabank", "MegaBank Corp", "enterprise", "banking"),
                tenant("org-smallcorp", "Small Corp", "starter", "fintech"),
            ],
        )
    }

    pub fn identity(&self, id: &str) -> Option<&Identity> {
        self.identities.iter().find(|i| i.id == id)
    }

    pub fn tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    /// Resolve both halves of a selection; `None` if either is unknown.
    pub fn resolve(&self, identity_id: &str, tenant_id: &str) -> Option<(&Identity, &Tenant)> {
        Some((self.identity(identity_id)?, self.tenant(tenant_id)?))
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    pub fn listing(&self) -> CatalogListing {
        CatalogListing {
            identities: self.identities.iter().map(IdentitySummary::from).collect(),
            tenants: self.tenants.clone(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}
