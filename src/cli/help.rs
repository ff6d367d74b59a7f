//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string attached to the command span (e.g. "serve", "present").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Serve { .. } => "serve",
        Commands::Present { .. } => "present",
        Commands::Evaluate { .. } => "evaluate",
        Commands::Catalog { .. } => "catalog",
        Commands::Config { .. } => "config",
    }
}

/// Whether the command draws to stdout itself, so logs must go elsewhere.
pub fn owns_stdout(command: &Commands) -> bool {
    matches!(command, Commands::Present { .. })
}
