//! Properties of context construction

use flagbridge::catalog::{Identity, Tenant};
use flagbridge::context::{build_context, ContextShape};
use proptest::prelude::*;

fn identity() -> impl Strategy<Value = Identity> {
    ("[a-z0-9-]{1,10}", "[A-Za-z ]{1,20}", "[a-z]{1,8}@[a-z]{1,8}\\.com", "[a-z]{1,10}").prop_map(
        |(id, name, email, role)| Identity {
            id,
            name,
            email,
            role,
        },
    )
}

fn tenant() -> impl Strategy<Value = Tenant> {
    ("[a-z0-9-]{1,10}", "[A-Za-z ]{1,20}", "[a-z]{1,10}", "[a-z]{1,10}").prop_map(
        |(id, name, tier, industry)| Tenant {
            id,
            name,
            tier,
            industry,
        },
    )
}

proptest! {
    #[test]
    fn redacted_context_never_serializes_email(identity in identity(), tenant in tenant()) {
        let context = build_context(&identity, &tenant, ContextShape::Redacted);
        let json = serde_json::to_value(&context).unwrap();
        prop_assert!(json["user"].get("email").is_none());
        prop_assert_eq!(json["kind"].as_str(), Some("multi"));
        prop_assert_eq!(json["user"]["key"].as_str(), Some(identity.id.as_str()));
        prop_assert_eq!(json["organization"]["key"].as_str(), Some(tenant.id.as_str()));
    }

    #[test]
    fn full_context_keeps_email(identity in identity(), tenant in tenant()) {
        let context = build_context(&identity, &tenant, ContextShape::Full);
        prop_assert_eq!(context.user.email.as_deref(), Some(identity.email.as_str()));
        prop_assert_eq!(context.organization.industry.as_deref(), Some(tenant.industry.as_str()));
    }
}
