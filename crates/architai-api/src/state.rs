//! Application state shared by the CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use architai_infra::config::{apply_env_overrides, load_client_config, resolve_diagram_dir};
use architai_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use architai_infra::gateway::HttpSessionGateway;
use architai_types::config::ClientConfig;

/// Resolved configuration plus the concrete gateway.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub diagram_dir: PathBuf,
    pub gateway: Arc<HttpSessionGateway>,
}

impl AppState {
    /// Load config and build the gateway.
    ///
    /// Precedence for the service URL: `--base-url`, then
    /// `ARCHITAI_API_BASE_URL`, then `config.toml`, then the default.
    pub async fn init(base_url_override: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let mut config = apply_env_overrides(load_client_config(&data_dir).await);
        if let Some(base_url) = base_url_override {
            config.base_url = base_url;
        }

        let gateway =
            HttpSessionGateway::new(&config).context("Failed to configure the session gateway")?;
        let diagram_dir = resolve_diagram_dir(&config, &data_dir);

        tracing::debug!(
            base_url = %gateway.base_url(),
            data_dir = %data_dir.display(),
            reply_format = ?config.reply_format,
            "Application state initialized"
        );

        Ok(Self {
            config,
            diagram_dir,
            gateway: Arc::new(gateway),
        })
    }
}
