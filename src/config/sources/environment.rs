//! Environment sources: `FLAGBRIDGE_*` nested variables and the flat deployment
//! variables the service has always honoured.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use std::collections::HashMap;

/// Flat variable name and the config key it sets.
pub const FLAT_VARIABLES: [(&str, &str); 5] = [
    ("LAUNCHDARKLY_SDK_KEY", "provider.sdk_key"),
    ("LAUNCHDARKLY_CLIENT_SDK_KEY", "provider.client_sdk_key"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("CLIENT_URL", "server.client_url"),
];

/// Add `FLAGBRIDGE_SECTION__FIELD` variables and the flat variables from `env`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    env: &HashMap<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder.add_source(
        Environment::with_prefix("FLAGBRIDGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(env.clone())),
    );

    for (variable, key) in FLAT_VARIABLES {
        let value = env
            .get(variable)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        builder = builder.set_override_option(key, value)?;
    }

    Ok(builder)
}
