//! CLI presentation: text and JSON formatters for the non-interactive commands.

use crate::catalog::CatalogListing;
use crate::config::BridgeConfig;
use crate::error::ApiError;
use crate::evaluation::EvaluationResponse;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Render(e.to_string()))
}

/// Section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_catalog_text(listing: &CatalogListing) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Users")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Name", "Role"]);
    for user in &listing.identities {
        table.add_row(vec![user.id.clone(), user.name.clone(), user.role.clone()]);
    }
    out.push_str(&format!("{}\n\n", table));

    out.push_str(&format!("{}\n\n", format_section_heading("Organizations")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Name", "Tier", "Industry"]);
    for org in &listing.tenants {
        table.add_row(vec![
            org.id.clone(),
            org.name.clone(),
            org.tier.clone(),
            org.industry.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_catalog_json(listing: &CatalogListing) -> Result<String, ApiError> {
    to_json(listing)
}

pub fn format_evaluation_text(response: &EvaluationResponse) -> String {
    let mut out = String::new();
    let user = &response.context.user;
    let org = &response.context.organization;
    out.push_str(&format!(
        "{} {} ({}) @ {} ({})\n\n",
        "Context:".bold(),
        user.name,
        user.role,
        org.name,
        org.tier
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Flag", "Value"]);
    for (key, value) in response.flags.iter() {
        let value = if value {
            format!("{}", "true".green())
        } else {
            format!("{}", "false".red())
        };
        table.add_row(vec![key.to_string(), value]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!(
        "Source: {}\nTimestamp: {}",
        response.evaluation_source, response.timestamp
    ));
    out
}

pub fn format_evaluation_json(response: &EvaluationResponse) -> Result<String, ApiError> {
    to_json(response)
}

/// Effective configuration as TOML, keys masked.
pub fn format_config(config: &BridgeConfig) -> Result<String, ApiError> {
    toml::to_string_pretty(&config.redacted())
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize config: {}", e)))
}
