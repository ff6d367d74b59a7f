//! Config loader facade: assembles sources in merge-policy order and deserializes.

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::BridgeConfig;
use crate::error::ApiError;
use config::File;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything a load depends on, captured up front.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory holding `config/config.toml`
    pub workspace_root: PathBuf,
    /// Explicit file; replaces the global and workspace files
    pub config_file: Option<PathBuf>,
    /// Global file location, normally from [`global_config_path`](super::global_config_path)
    pub global_file: Option<PathBuf>,
    /// Environment snapshot
    pub env: HashMap<String, String>,
}

impl LoadOptions {
    /// Options for `workspace_root` taken from the running process.
    pub fn from_process(workspace_root: &Path, config_file: Option<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.to_path_buf(),
            config_file,
            global_file: global_file::global_config_path(),
            env: std::env::vars().collect(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace from files and the process environment.
    pub fn load(workspace_root: &Path) -> Result<BridgeConfig, ApiError> {
        Self::load_with(&LoadOptions::from_process(workspace_root, None))
    }

    /// Load configuration from a single file plus the process environment.
    pub fn load_from_file(path: &Path) -> Result<BridgeConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        Self::load_with(&LoadOptions::from_process(
            Path::new("."),
            Some(path.to_path_buf()),
        ))
    }

    pub fn load_with(options: &LoadOptions) -> Result<BridgeConfig, ApiError> {
        let mut builder = builder_with_defaults()?;

        match options.config_file {
            Some(ref path) => {
                builder = builder.add_source(File::from(path.clone()).required(true));
            }
            None => {
                builder = global_file::add_to_builder(builder, options.global_file.as_deref())?;
                let env_name = options
                    .env
                    .get("FLAGBRIDGE_ENV")
                    .map(String::as_str)
                    .unwrap_or("development");
                builder =
                    workspace_file::add_to_builder(builder, &options.workspace_root, env_name)?;
            }
        }

        builder = environment::add_to_builder(builder, &options.env)?;

        let config: BridgeConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
