//! Properties of the Context Store evaluation path

use flagbridge::catalog::Catalog;
use flagbridge::error::ApiError;
use flagbridge::evaluation::ContextStore;
use flagbridge::flags::{EvaluationSource, FlagSet};
use proptest::prelude::*;
use std::sync::Arc;

const USERS: [&str; 3] = ["user-1", "user-2", "user-3"];
const ORGS: [&str; 2] = ["org-megabank", "org-smallcorp"];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn store() -> ContextStore {
    ContextStore::fallback_only(Arc::new(Catalog::demo()))
}

proptest! {
    /// Any pair where either id is unknown is rejected.
    #[test]
    fn unknown_pairs_are_not_found(user in "[a-z0-9-]{0,12}", org in "[a-z0-9-]{0,16}") {
        prop_assume!(!(USERS.contains(&user.as_str()) && ORGS.contains(&org.as_str())));
        let result = runtime().block_on(store().evaluate(&user, &org));
        prop_assert!(
            matches!(result, Err(ApiError::NotFound { .. })),
            "expected NotFound for {}/{}",
            user,
            org
        );
    }

    /// Valid pairs without a provider are fallback with every flag false, and the
    /// response never carries an email.
    #[test]
    fn valid_pairs_without_provider_are_fallback(user_idx in 0usize..3, org_idx in 0usize..2) {
        let catalog = Catalog::demo();
        let response = runtime()
            .block_on(store().evaluate(USERS[user_idx], ORGS[org_idx]))
            .unwrap();
        prop_assert_eq!(response.evaluation_source, EvaluationSource::Fallback);
        prop_assert_eq!(response.flags, FlagSet::defaults());

        let body = serde_json::to_string(&response).unwrap();
        for identity in catalog.identities() {
            prop_assert!(!body.contains(&identity.email));
        }
    }
}
