//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::catalog::Catalog;
use crate::config::{BridgeConfig, ConfigLoader};
use crate::error::ApiError;
use crate::evaluation::ContextStore;
use crate::presenter::console::{run_interactive, run_once};
use crate::presenter::{
    ContextStoreApi, HttpStoreClient, LocalStoreClient, PresenterSession, RenderOptions, Selection,
};
use crate::provider::bootstrap::init_server_provider;
use crate::server::start_server;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use crate::cli::output::map_validation_errors;
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_catalog_json, format_catalog_text, format_config, format_evaluation_json,
    format_evaluation_text,
};
use crate::cli::command_name;

/// Runtime context for CLI execution: the loaded configuration.
pub struct RunContext {
    config: BridgeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        let span = info_span!("command", name);
        let result = self.execute_inner(command).instrument(span).await;
        info!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Serve { host, port } => self.handle_serve(host.clone(), *port).await,
            Commands::Present {
                server_url,
                user,
                org,
                once,
                format,
                local,
            } => {
                self.handle_present(
                    server_url.as_deref(),
                    Selection::new(user.clone(), org.clone()),
                    *once,
                    *format,
                    *local,
                )
                .await
            }
            Commands::Evaluate {
                user_id,
                org_id,
                format,
            } => self.handle_evaluate(user_id, org_id, *format).await,
            Commands::Catalog { format } => self.handle_catalog(*format),
            Commands::Config { validate } => self.handle_config(*validate),
        }
    }

    async fn handle_serve(
        &self,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<String, ApiError> {
        let mut config = self.config.clone();
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
        config.validate().map_err(|e| map_validation_errors(&e))?;
        start_server(&config).await?;
        Ok(String::new())
    }

    /// Context Store backed by this process, provider included when configured.
    async fn local_store(&self) -> Arc<ContextStore> {
        let provider = init_server_provider(&self.config.provider).await;
        Arc::new(ContextStore::new(
            Arc::new(Catalog::demo()),
            provider,
            Arc::new(crate::audit::TracingAuditSink),
        ))
    }

    async fn handle_present(
        &self,
        server_url: Option<&str>,
        selection: Selection,
        once: bool,
        format: OutputFormat,
        local: bool,
    ) -> Result<String, ApiError> {
        let local_store = if local {
            Some(self.local_store().await)
        } else {
            None
        };
        let store: Arc<dyn ContextStoreApi> = if let Some(local_store) = &local_store {
            Arc::new(LocalStoreClient::new(
                local_store.clone(),
                self.config.provider.client_key().map(str::to_string),
            ))
        } else {
            let url = server_url.unwrap_or(&self.config.presenter.server_url);
            Arc::new(HttpStoreClient::new(
                url,
                self.config.provider.request_timeout(),
            )?)
        };

        let session = PresenterSession::start(store, &self.config.provider).await;
        let options = RenderOptions {
            color: self.config.presenter.color && format == OutputFormat::Text,
            development: self.config.presenter.development_mode(),
        };

        let result = if once {
            Ok(run_once(&session, selection, &options, format == OutputFormat::Json).await)
        } else {
            run_interactive(&session, selection, &options)
                .await
                .map(|()| String::new())
        };
        session.shutdown().await;
        if let Some(local_store) = &local_store {
            close_provider(local_store).await;
        }
        result
    }

    async fn handle_evaluate(
        &self,
        user_id: &str,
        org_id: &str,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let store = self.local_store().await;
        let response = store.evaluate(user_id, org_id).await;
        close_provider(&store).await;
        let response = response?;
        match format {
            OutputFormat::Json => format_evaluation_json(&response),
            OutputFormat::Text => Ok(format_evaluation_text(&response)),
        }
    }

    fn handle_catalog(&self, format: OutputFormat) -> Result<String, ApiError> {
        let listing = Catalog::demo().listing();
        match format {
            OutputFormat::Json => format_catalog_json(&listing),
            OutputFormat::Text => Ok(format_catalog_text(&listing)),
        }
    }

    fn handle_config(&self, validate: bool) -> Result<String, ApiError> {
        if validate {
            self.config
                .validate()
                .map_err(|e| map_validation_errors(&e))?;
        }
        format_config(&self.config)
    }
}

/// Close the store's server-side provider, if any. Failures are logged only.
async fn close_provider(store: &ContextStore) {
    if let Some(provider) = store.provider() {
        if let Err(e) = provider.close().await {
            warn!(error = %e, "Failed to close provider client");
        }
    }
}
