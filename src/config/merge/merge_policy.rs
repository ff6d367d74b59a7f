//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources win: defaults < global file < workspace files (or explicit file)
//! < `FLAGBRIDGE_*` variables < flat deployment variables.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3001_i64)?
        .set_default("server.client_url", "http://localhost:5173")?
        .set_default("provider.base_url", "https://sdk.launchdarkly.com")?
        .set_default("provider.client_base_url", "https://clientsdk.launchdarkly.com")?
        .set_default("provider.init_timeout_ms", 5_000_i64)?
        .set_default("provider.request_timeout_ms", 10_000_i64)?
        .set_default("presenter.server_url", "http://localhost:3001")?
        .set_default("presenter.development", false)
}
