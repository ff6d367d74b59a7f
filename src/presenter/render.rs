//! Snapshot rendering.
//!
//! Pure functions of a [`PresenterSnapshot`]: the same snapshot always renders the same
//! output.

use super::state::PresenterSnapshot;
use crate::error::ApiError;
use crate::flags::{EvaluationSource, FlagSet};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
    pub development: bool,
}

fn heading(title: &str, options: &RenderOptions) -> String {
    if options.color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

fn flag_value(value: bool, options: &RenderOptions) -> String {
    match (value, options.color) {
        (true, true) => format!("{}", "true".green()),
        (false, true) => format!("{}", "false".red()),
        (v, false) => v.to_string(),
    }
}

fn flag_table(flags: &FlagSet, options: &RenderOptions) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Flag", "Value"]);
    for (key, value) in flags.iter() {
        table.add_row(vec![key.to_string(), flag_value(value, options)]);
    }
    table
}

fn source_label(source: EvaluationSource) -> &'static str {
    match source {
        EvaluationSource::LaunchDarkly => "provider",
        EvaluationSource::Fallback => "fallback (no provider)",
        EvaluationSource::FallbackError => "fallback (provider error)",
    }
}

/// Blocking error panel shown instead of the flag view.
pub fn render_error_panel(message: &str, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", heading("Error", options)));
    out.push_str(&format!("  {}\n", message));
    out
}

pub fn render_text(snapshot: &PresenterSnapshot, options: &RenderOptions) -> String {
    if let Some(error) = snapshot.error.as_deref() {
        return render_error_panel(error, options);
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", heading("Feature Flag Context Demo", options)));

    let user = snapshot
        .identity
        .as_ref()
        .map(|i| format!("{} ({})", i.name, i.role))
        .unwrap_or_else(|| snapshot.selection.user_id.clone());
    let org = snapshot
        .tenant
        .as_ref()
        .map(|t| format!("{} ({})", t.name, t.tier))
        .unwrap_or_else(|| snapshot.selection.org_id.clone());
    out.push_str(&format!("Current context: {} @ {}\n\n", user, org));

    out.push_str(&format!("{}\n\n", heading("Evaluation context", options)));
    let context_json = serde_json::to_string_pretty(&snapshot.context)
        .unwrap_or_else(|e| format!("<unserializable context: {}>", e));
    out.push_str(&context_json);
    out.push_str("\n\n");

    out.push_str(&format!("{}\n\n", heading("Context details", options)));
    let ctx = &snapshot.context;
    out.push_str(&format!("  User key:      {}\n", ctx.user.key));
    out.push_str(&format!(
        "  User role:     {}\n",
        ctx.user.role.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("  Organization:  {}\n", ctx.organization.key));
    out.push_str(&format!("  Tier:          {}\n", ctx.organization.tier));
    out.push_str(&format!(
        "  Industry:      {}\n\n",
        ctx.organization.industry.as_deref().unwrap_or("-")
    ));

    out.push_str(&format!("{}\n\n", heading("Server-side flags", options)));
    match snapshot.server.as_ref() {
        Some(response) => {
            out.push_str(&format!("{}\n", flag_table(&response.flags, options)));
            out.push_str(&format!(
                "  Source: {}\n  Evaluated at: {}\n\n",
                source_label(response.evaluation_source),
                response.timestamp
            ));
        }
        None => out.push_str("  Loading...\n\n"),
    }

    out.push_str(&format!("{}\n\n", heading("Client-side flags", options)));
    out.push_str(&format!("{}\n", flag_table(&snapshot.client.flags, options)));
    if snapshot.client.connected {
        out.push_str("  Source: client provider (live)\n");
    } else {
        out.push_str("  Fallback mode: client provider not connected, showing default values\n");
    }

    out
}

pub fn render_json(snapshot: &PresenterSnapshot) -> Result<String, ApiError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| ApiError::Render(e.to_string()))
}
