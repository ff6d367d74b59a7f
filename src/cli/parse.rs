//! CLI parse: clap types for flagbridge. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// flagbridge - feature-flag context demo: evaluation service and operator console
#[derive(Parser)]
#[command(name = "flagbridge")]
#[command(about = "Feature-flag context demo: Context Store server and operator console")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config/config.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Context Store HTTP server
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the bind port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open the operator console
    Present {
        /// Context Store base URL (defaults to presenter.server_url)
        #[arg(long)]
        server_url: Option<String>,
        /// Initial user id
        #[arg(long, default_value = "user-1")]
        user: String,
        /// Initial organization id
        #[arg(long, default_value = "org-megabank")]
        org: String,
        /// Render once and exit instead of running the interactive loop
        #[arg(long)]
        once: bool,
        /// Output format for --once (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Use an in-process Context Store instead of an HTTP server
        #[arg(long)]
        local: bool,
    },
    /// Evaluate the three flags for one user/organization pair
    Evaluate {
        /// User id (e.g. user-1)
        user_id: String,
        /// Organization id (e.g. org-megabank)
        org_id: String,
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List the demo users and organizations
    Catalog {
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the effective configuration with secrets masked
    Config {
        /// Also run validation
        #[arg(long)]
        validate: bool,
    },
}
