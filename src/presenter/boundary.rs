//! Top-level render boundary.
//!
//! A panic during rendering must not take the console down. [`guard`] catches it and
//! returns a recovery panel instead; development mode adds the panic message and the
//! stage that failed.

use crate::error::ApiError;
use std::any::Any;
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(String),
    Recovered { panel: String, error: ApiError },
}

impl RenderOutcome {
    /// Text to print, whichever way the render went.
    pub fn into_output(self) -> String {
        match self {
            RenderOutcome::Rendered(out) => out,
            RenderOutcome::Recovered { panel, .. } => panel,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, RenderOutcome::Recovered { .. })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub fn guard<F>(stage: &str, development: bool, render: F) -> RenderOutcome
where
    F: FnOnce() -> String + UnwindSafe,
{
    match catch_unwind(render) {
        Ok(out) => RenderOutcome::Rendered(out),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(stage, error = %message, "Render failed");

            let mut panel = String::from("Something went wrong\n\n");
            panel.push_str("The console hit an unexpected error while drawing the view.\n");
            panel.push_str("Choose \"Reload\" to start over.\n");
            if development {
                panel.push_str(&format!("\nStage: {}\nError: {}\n", stage, message));
            }
            RenderOutcome::Recovered {
                panel,
                error: ApiError::Render(format!("{}: {}", stage, message)),
            }
        }
    }
}
