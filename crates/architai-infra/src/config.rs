//! Client configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.architai/` in production)
//! and deserializes it into [`ClientConfig`]. Falls back to defaults when the
//! file is missing or malformed, then layers environment overrides on top.

use std::path::{Path, PathBuf};

use architai_types::config::ClientConfig;
use architai_types::error::ConfigError;
use secrecy::SecretString;

/// Overrides `base_url`.
pub const ENV_BASE_URL: &str = "ARCHITAI_API_BASE_URL";
/// Overrides `api_token`.
pub const ENV_API_TOKEN: &str = "ARCHITAI_API_TOKEN";

/// Read `{data_dir}/config.toml` strictly.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_client_config(data_dir: &Path) -> Result<Option<ClientConfig>, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                source,
            });
        }
    };

    toml::from_str::<ClientConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: config_path.display().to_string(),
            message: err.to_string(),
        })
}

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file cannot be read or parsed, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    match read_client_config(data_dir).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!(
                "No config.toml found in {}, using defaults",
                data_dir.display()
            );
            ClientConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            ClientConfig::default()
        }
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: ClientConfig) -> ClientConfig {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from `lookup`. Blank values are ignored.
pub fn apply_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = non_blank(ENV_BASE_URL) {
        config.base_url = base_url.trim().to_string();
    }
    if let Some(token) = non_blank(ENV_API_TOKEN) {
        config.api_token = Some(SecretString::from(token));
    }
    config
}

/// Directory rendered diagrams are written to.
///
/// The configured `diagram_dir` wins; relative paths are taken relative to
/// the data directory. Defaults to `{data_dir}/diagrams`.
pub fn resolve_diagram_dir(config: &ClientConfig, data_dir: &Path) -> PathBuf {
    match &config.diagram_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => data_dir.join(dir),
        None => data_dir.join("diagrams"),
    }
}
