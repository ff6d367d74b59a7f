//! Evaluation context construction.
//!
//! Both the server and the console build multi-kind contexts through
//! [`build_context`]. The shape decides whether the subject's email travels with the
//! context; the response view returned to callers never carries it.

use crate::catalog::{Identity, IdentitySummary, Tenant};
use serde::{Deserialize, Serialize};

/// Which identity attributes a context carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextShape {
    /// Everything the provider may target on, email included.
    Full,
    /// Email stripped.
    Redacted,
}

/// Identity attributes a context can be built from.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub email: Option<&'a str>,
}

impl<'a> From<&'a Identity> for Subject<'a> {
    fn from(identity: &'a Identity) -> Self {
        Self {
            id: &identity.id,
            name: &identity.name,
            role: &identity.role,
            email: Some(&identity.email),
        }
    }
}

impl<'a> From<&'a IdentitySummary> for Subject<'a> {
    fn from(summary: &'a IdentitySummary) -> Self {
        Self {
            id: &summary.id,
            name: &summary.name,
            role: &summary.role,
            email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationContext {
    pub key: String,
    pub name: String,
    pub tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// Multi-kind context pairing a user with an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub kind: String,
    pub user: UserContext,
    pub organization: OrganizationContext,
}

/// Build a multi-kind context for `subject` acting within `tenant`.
pub fn build_context<'a>(
    subject: impl Into<Subject<'a>>,
    tenant: &Tenant,
    shape: ContextShape,
) -> EvaluationContext {
    let subject = subject.into();
    let email = match shape {
        ContextShape::Full => subject.email.map(str::to_string),
        ContextShape::Redacted => None,
    };

    EvaluationContext {
        kind: "multi".to_string(),
        user: UserContext {
            key: subject.id.to_string(),
            name: subject.name.to_string(),
            email,
            role: Some(subject.role.to_string()),
            anonymous: false,
        },
        organization: OrganizationContext {
            key: tenant.id.clone(),
            name: tenant.name.clone(),
            tier: tenant.tier.clone(),
            industry: Some(tenant.industry.clone()),
        },
    }
}

impl EvaluationContext {
    /// Context a client provider starts with before any selection is made.
    pub fn anonymous() -> Self {
        Self {
            kind: "multi".to_string(),
            user: UserContext {
                key: "anonymous".to_string(),
                name: "Anonymous User".to_string(),
                email: None,
                role: None,
                anonymous: true,
            },
            organization: OrganizationContext {
                key: "demo-org".to_string(),
                name: "Demo Organization".to_string(),
                tier: "starter".to_string(),
                industry: None,
            },
        }
    }

    /// Context shown while the selection is not resolvable yet.
    pub fn placeholder() -> Self {
        Self {
            kind: "multi".to_string(),
            user: UserContext {
                key: "anonymous".to_string(),
                name: "Anonymous User".to_string(),
                email: None,
                role: Some("unknown".to_string()),
                anonymous: false,
            },
            organization: OrganizationContext {
                key: "demo-org".to_string(),
                name: "Demo Organization".to_string(),
                tier: "starter".to_string(),
                industry: Some("unknown".to_string()),
            },
        }
    }

    pub fn user_key(&self) -> &str {
        &self.user.key
    }

    pub fn organization_key(&self) -> &str {
        &self.organization.key
    }
}

/// Context echoed back to callers of the evaluation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseContext {
    pub user: IdentitySummary,
    pub organization: Tenant,
}

impl ResponseContext {
    pub fn new(identity: &Identity, tenant: &Tenant) -> Self {
        Self {
            user: IdentitySummary::from(identity),
            organization: tenant.clone(),
        }
    }
}
