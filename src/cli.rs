//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, owns_stdout};
pub use output::{map_error, map_validation_errors};
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{
    format_catalog_json, format_catalog_text, format_config, format_evaluation_json,
    format_evaluation_text, format_section_heading,
};
pub use route::RunContext;
