//! Context Presenter: the operator console.
//!
//! Lets an operator pick an identity/tenant pair, then shows the active context, the
//! server-evaluated flags fetched from the Context Store and the flags evaluated by an
//! embedded client-side provider. Rendering is a pure function of
//! [`PresenterState`]; fetches are tagged with tickets so only the latest result for
//! each lifecycle is ever applied.

use serde::{Deserialize, Serialize};

pub mod boundary;
pub mod console;
pub mod fetch;
pub mod render;
pub mod session;
pub mod state;

pub use boundary::{guard, RenderOutcome};
pub use fetch::{ContextStoreApi, HttpStoreClient, LocalStoreClient};
pub use render::{render_json, render_text, RenderOptions};
pub use session::PresenterSession;
pub use state::{ClientMode, PresenterSnapshot, PresenterState, Selection, Ticket};

/// Operator console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Base URL of the Context Store
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Show raw error details when rendering fails
    #[serde(default)]
    pub development: bool,

    /// Colour flag values in text output
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_server_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            development: false,
            color: default_true(),
        }
    }
}

impl PresenterConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !crate::config::is_http_url(&self.server_url) {
            return Err(format!(
                "server_url must be an http(s) URL, got '{}'",
                self.server_url
            ));
        }
        Ok(())
    }

    /// Development mode from config or `FLAGBRIDGE_ENV=development`.
    pub fn development_mode(&self) -> bool {
        self.development
            || std::env::var("FLAGBRIDGE_ENV")
                .map(|v| v == "development")
                .unwrap_or(false)
    }
}
